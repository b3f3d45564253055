//! Colors for the topology view.
//!
//! Node fill comes from the status tone; the outline comes from the node
//! kind. Edges are colored by connection kind.

use super::model::{ConnectionKind, NodeKind};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Color category for a free-form status string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
	Positive,
	Neutral,
	Negative,
	Informational,
}

impl StatusTone {
	/// Case-insensitive lookup; unknown statuses are informational.
	pub fn classify(status: &str) -> Self {
		match status.trim().to_ascii_lowercase().as_str() {
			"active" | "running" | "up" | "online" | "connected" => StatusTone::Positive,
			"stopped" | "down" | "offline" | "disconnected" => StatusTone::Neutral,
			"error" | "failed" | "unhealthy" => StatusTone::Negative,
			_ => StatusTone::Informational,
		}
	}
}

/// Fill color per status tone.
#[derive(Clone, Debug)]
pub struct ToneColors {
	pub positive: Color,
	pub neutral: Color,
	pub negative: Color,
	pub informational: Color,
}

/// Outline color per node kind.
#[derive(Clone, Debug)]
pub struct KindColors {
	pub network_group: Color,
	pub application: Color,
	pub addon: Color,
	pub external_peer: Color,
	pub internal_peer: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: Color,
	pub tones: ToneColors,
	pub kinds: KindColors,
	pub membership_edge: Color,
	pub peering_edge: Color,
	pub selection_ring: Color,
	pub label: Color,
	pub sublabel: Color,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			tones: ToneColors {
				positive: Color::rgb(46, 160, 67),
				neutral: Color::rgb(110, 118, 129),
				negative: Color::rgb(218, 54, 51),
				informational: Color::rgb(56, 139, 253),
			},
			kinds: KindColors {
				network_group: Color::rgb(163, 113, 247),
				application: Color::rgb(94, 129, 172),
				addon: Color::rgb(100, 148, 160),
				external_peer: Color::rgb(210, 153, 34),
				internal_peer: Color::rgb(136, 160, 175),
			},
			membership_edge: Color::rgba(140, 160, 180, 0.7),
			peering_edge: Color::rgba(210, 153, 34, 0.7),
			selection_ring: Color::rgb(255, 255, 255),
			label: Color::rgba(255, 255, 255, 0.9),
			sublabel: Color::rgba(200, 210, 220, 0.7),
		}
	}
}

impl Theme {
	pub fn status_color(&self, status: &str) -> Color {
		match StatusTone::classify(status) {
			StatusTone::Positive => self.tones.positive,
			StatusTone::Neutral => self.tones.neutral,
			StatusTone::Negative => self.tones.negative,
			StatusTone::Informational => self.tones.informational,
		}
	}

	pub fn kind_color(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::NetworkGroup => self.kinds.network_group,
			NodeKind::Application => self.kinds.application,
			NodeKind::Addon => self.kinds.addon,
			NodeKind::ExternalPeer => self.kinds.external_peer,
			NodeKind::InternalPeer => self.kinds.internal_peer,
		}
	}

	pub fn edge_color(&self, kind: ConnectionKind) -> Color {
		match kind {
			ConnectionKind::Membership => self.membership_edge,
			ConnectionKind::Peering => self.peering_edge,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn statuses_map_to_tones() {
		assert_eq!(StatusTone::classify("Running"), StatusTone::Positive);
		assert_eq!(StatusTone::classify(" up "), StatusTone::Positive);
		assert_eq!(StatusTone::classify("STOPPED"), StatusTone::Neutral);
		assert_eq!(StatusTone::classify("down"), StatusTone::Neutral);
		assert_eq!(StatusTone::classify("failed"), StatusTone::Negative);
		assert_eq!(StatusTone::classify("error"), StatusTone::Negative);
		assert_eq!(StatusTone::classify("deploying"), StatusTone::Informational);
		assert_eq!(StatusTone::classify(""), StatusTone::Informational);
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(0, 0, 0, 0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}
}
