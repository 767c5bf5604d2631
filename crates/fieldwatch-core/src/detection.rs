//! Turning classifier output into reportable detections.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separator between crop and disease in model class names.
const CLASS_SEPARATOR: &str = "___";

/// Default minimum confidence for a detection to be reported.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.9;

/// Raw output of the image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Model class such as `Tomato___Late_blight`.
    pub class: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    /// Creates a classification.
    pub fn new(class: impl Into<String>, confidence: f64) -> Self {
        Self {
            class: class.into(),
            confidence,
        }
    }
}

/// A disease ready to be reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedDisease {
    /// Human-readable disease label.
    pub disease_type: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl DetectedDisease {
    /// Creates a detection, validating label and confidence.
    pub fn new(disease_type: impl Into<String>, confidence: f64) -> Result<Self> {
        let disease_type = disease_type.into();
        if disease_type.trim().is_empty() {
            return Err(Error::validation_field(
                "diseaseType",
                "disease type must not be empty",
            ));
        }
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(Error::validation_field(
                "confidence",
                format!("confidence {confidence} is outside [0, 1]"),
            ));
        }
        Ok(Self {
            disease_type,
            confidence,
        })
    }
}

/// Human-readable label of a model class.
///
/// # Examples
///
/// ```
/// use fieldwatch_core::disease_label;
///
/// assert_eq!(disease_label("Tomato___Late_blight"), "Late blight");
/// assert_eq!(disease_label("Rust"), "Rust");
/// ```
pub fn disease_label(class: &str) -> String {
    match class.split_once(CLASS_SEPARATOR) {
        Some((_, disease)) if !disease.is_empty() => disease.replace('_', " "),
        _ => class.to_string(),
    }
}

/// Returns `true` if a label names a healthy plant.
pub fn is_healthy(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}

/// Decides whether a classification is worth reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionGate {
    /// Minimum confidence, inclusive.
    pub min_confidence: f64,
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl DetectionGate {
    /// Creates a gate with a custom threshold.
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Returns the detection to report, or `None` if the classification is
    /// healthy, below the threshold, or out of range.
    pub fn evaluate(&self, classification: &Classification) -> Option<DetectedDisease> {
        let label = disease_label(&classification.class);
        if is_healthy(&label) || classification.confidence < self.min_confidence {
            log::debug!(
                "Not reporting '{label}' at {:.3} confidence",
                classification.confidence
            );
            return None;
        }
        DetectedDisease::new(label, classification.confidence).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_disease_label() {
        assert_eq!(disease_label("Tomato___Late_blight"), "Late blight");
        assert_eq!(
            disease_label("Corn_(maize)___Common_rust_"),
            "Common rust "
        );
        assert_eq!(disease_label("Late_blight"), "Late_blight");
        assert_eq!(disease_label("Apple___"), "Apple___");
    }

    #[test]
    fn test_healthy_never_reported() {
        let gate = DetectionGate::default();
        assert!(gate
            .evaluate(&Classification::new("Tomato___healthy", 0.99))
            .is_none());
        assert!(gate
            .evaluate(&Classification::new("Healthy", 0.99))
            .is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let gate = DetectionGate::default();
        let at = gate
            .evaluate(&Classification::new("Tomato___Leaf_Mold", 0.9))
            .unwrap();
        assert_eq!(at.disease_type, "Leaf Mold");
        assert!(gate
            .evaluate(&Classification::new("Tomato___Leaf_Mold", 0.899))
            .is_none());
    }

    #[test]
    fn test_custom_threshold() {
        let gate = DetectionGate::new(0.5);
        assert!(gate
            .evaluate(&Classification::new("Potato___Early_blight", 0.6))
            .is_some());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let gate = DetectionGate::default();
        assert!(gate.evaluate(&Classification::new("Rust", 1.5)).is_none());
        assert!(DetectedDisease::new("Rust", -0.1).is_err());
        assert!(DetectedDisease::new(" ", 0.9).is_err());
    }
}
