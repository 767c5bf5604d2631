mod insert;
mod lifecycle;
mod reconcile;
