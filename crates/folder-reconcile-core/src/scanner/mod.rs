mod walk;

pub use walk::TreeScanner;
