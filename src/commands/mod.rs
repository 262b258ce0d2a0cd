mod install;

pub use install::{InstallOptions, PackageLocator, install, run};
