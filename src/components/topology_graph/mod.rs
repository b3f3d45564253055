//! Network-group topology visualization.
//!
//! Renders one network group as a star graph on an HTML canvas:
//! - The group itself at the center, members and peers around it
//! - Tap to select, drag nodes or the background, pinch and wheel zoom
//! - Double-click zooms to fit
//! - Status-colored nodes and dashed peering edges
//!
//! [`TopologyState`] is the host-independent engine; [`TopologyGraphCanvas`]
//! wires it to a canvas element.
//!
//! # Example
//!
//! ```ignore
//! use net_topology::{TopologyGraphCanvas, TopologySnapshot};
//!
//! let (snapshot, set_snapshot) = signal(None::<TopologySnapshot>);
//!
//! view! {
//!     <TopologyGraphCanvas
//!         snapshot=snapshot
//!         on_select={move |id: Option<String>| log::info!("selected {id:?}")}
//!         fullscreen=true
//!     />
//! }
//! ```

mod component;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod render;
pub mod scale;
pub mod selection;
pub mod state;
pub mod theme;
pub mod types;
pub mod viewport;

pub use component::TopologyGraphCanvas;
pub use error::DataIntegrityError;
pub use interaction::{GestureState, InteractionConfig};
pub use layout::{ForceRelaxation, LayoutConfig, LayoutKind, LayoutStrategy, RandomScatter};
pub use model::{ConnectionKind, GraphConnection, GraphModel, GraphNode, NodeId, NodeKind, Point};
pub use state::{Generation, RebuildOutcome, TopologyConfig, TopologyState};
pub use theme::Theme;
pub use types::{Member, MemberKind, NetworkGroupInfo, Peer, SnapshotLink, TopologySnapshot};
pub use viewport::Viewport;
