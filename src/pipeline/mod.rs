//! Pipeline module - loading, cleaning and the classification stages

pub mod error;
pub mod estimator;
pub mod loader;
pub mod pca;
pub mod preprocess;
pub mod search;
pub mod select;
pub mod stage;
pub mod svc;
pub mod table;

pub use error::{PipelineError, SearchError};
pub use estimator::*;
pub use loader::*;
pub use pca::{Pca, PcaComponents};
pub use preprocess::{ColumnPreprocessor, OneHotEncoder, StandardScaler, CATEGORICAL_COLUMNS};
pub use search::{
    concurrent_fits, kernel_matrix_bytes, CandidateResult, GridSearch, ParamGrid, SearchConfig, SearchResult,
    StratifiedKFold, DEFAULT_MEMORY_BUDGET_MB,
};
pub use select::{f_classif, SelectKBest};
pub use stage::{Stage, Transform};
pub use svc::{Kernel, SvcClassifier};
pub use table::{select_labels, FeatureTable};
