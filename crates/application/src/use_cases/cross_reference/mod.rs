mod check_cross_references;

pub use check_cross_references::CrossReferenceUseCase;
