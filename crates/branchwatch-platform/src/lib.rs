mod paths;

pub use paths::{AppPaths, AppPathsError, CA_FILE_NAME, VERSION_FILE_NAME};
