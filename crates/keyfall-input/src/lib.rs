// Input edges: per-source debouncing, per-tick queue, key bindings and scripted autoplay

mod edge;
mod edge_detector;
mod key_map;
mod queue;
mod scripted_input;

pub use edge::{EdgeKind, InputEdge, InputSource};
pub use edge_detector::EdgeDetector;
pub use key_map::KeyMap;
pub use queue::{InputQueue, StampedEdge};
pub use scripted_input::{ScriptedInput, ScriptedInputConfig};
