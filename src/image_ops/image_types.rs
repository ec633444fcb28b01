/// Output file formats of generated images
#[derive(Debug, PartialEq, Hash, Eq, Copy, Clone)]
pub enum Extensions {
    Jpeg,
    Png,
}

impl Extensions {
    pub fn name(&self) -> &str {
        match self {
            Extensions::Jpeg => "jpeg",
            Extensions::Png => "png",
        }
    }
}
