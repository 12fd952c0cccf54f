pub use crate::galaxy::{GalaxyParameters, PointCount, PointSet, RegenerateGalaxy};
pub use crate::viewer_config::ViewerConfig;
pub use crate::ui::RenderScale;
