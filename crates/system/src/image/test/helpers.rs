use std::path::PathBuf;

use crate::image::ImageContext;
use crate::image::info::ImageInfoLoader;
use crate::image::repository::Repository;
use crate::os::UBUNTU_X64;

pub fn test_context() -> ImageContext {
    ImageContext {
        os: UBUNTU_X64,
        home: PathBuf::from("/home/user"),
        work_dir: PathBuf::from("/tmp/system"),
    }
}

pub fn test_loader() -> ImageInfoLoader {
    ImageInfoLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/image"))
}

pub fn test_repository() -> Repository {
    Repository::new(test_loader(), UBUNTU_X64)
}
