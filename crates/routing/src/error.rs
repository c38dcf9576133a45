#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate route tag {tag:?} at routes[{index}]")]
    DuplicateTag { tag: String, index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
