//! Visual theming for the graph canvas.
//!
//! Colors, palettes and stroke styles. Everything here is draw-only and has
//! no effect on hit testing or layout.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rgb` or `#rrggbb`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		let channel = |s: &str| u8::from_str_radix(s, 16).ok();
		match digits.len() {
			3 => {
				let mut it = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
				Some(Self::rgb(it.next()??, it.next()??, it.next()??))
			}
			6 => Some(Self::rgb(
				channel(digits.get(0..2)?)?,
				channel(digits.get(2..4)?)?,
				channel(digits.get(4..6)?)?,
			)),
			_ => None,
		}
	}

	/// Parses a CSS color: hex (`#rgb`, `#rrggbb`) or `rgb()`/`rgba()` notation.
	pub fn parse(css: &str) -> Option<Self> {
		let css = css.trim();
		if css.starts_with('#') {
			return Self::from_hex(css);
		}
		let args = css
			.strip_prefix("rgba(")
			.or_else(|| css.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let parts: Vec<&str> = args.split(',').map(str::trim).collect();
		if !(3..=4).contains(&parts.len()) {
			return None;
		}
		let a = match parts.get(3) {
			Some(a) => a.parse().ok()?,
			None => 1.0,
		};
		Some(Self::rgba(
			parts[0].parse().ok()?,
			parts[1].parse().ok()?,
			parts[2].parse().ok()?,
			a,
		))
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Blends toward `other` by `t` in `[0, 1]`, keeping this color's opacity.
	pub fn mix(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let blend = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
		Self {
			r: blend(self.r, other.r),
			g: blend(self.g, other.g),
			b: blend(self.b, other.b),
			a: self.a,
		}
	}

	/// Blends toward white.
	pub fn lighten(self, amount: f64) -> Self {
		self.mix(Color::rgb(255, 255, 255), amount)
	}

	/// Blends toward black.
	pub fn darken(self, amount: f64) -> Self {
		self.mix(Color::rgb(0, 0, 0), amount)
	}

	/// CSS color string, `#rrggbb` when opaque.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fallback node fills, indexed by group or position.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Colors cycled through in order.
	pub colors: Vec<Color>,
}

impl NodePalette {
	fn from_hex(codes: &[u32]) -> Self {
		let colors = codes
			.iter()
			.map(|&c| Color::rgb((c >> 16) as u8, (c >> 8) as u8, c as u8))
			.collect();
		Self { colors }
	}

	/// Blues and teals for dark backgrounds.
	pub fn slate() -> Self {
		Self::from_hex(&[0x5b7fa8, 0x7f9fc0, 0x5f929c, 0x8aa2b2, 0x6a8aab, 0x76a0a6, 0x9a8fb8])
	}

	/// Greens and violets.
	pub fn aurora() -> Self {
		Self::from_hex(&[0x5f9585, 0x71879c, 0x857799, 0x628c92, 0x7a83a3, 0x7f948a])
	}

	/// Muted pastels for light backgrounds.
	pub fn pastel() -> Self {
		Self::from_hex(&[0xc9b2bd, 0xb0c3cf, 0xbdc8b2, 0xcfc2b0, 0xb8bcc9])
	}

	/// Color for slot `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		match self.colors.len() {
			0 => Color::rgb(128, 128, 128),
			n => self.colors[index % n],
		}
	}
}

/// Canvas background.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Outer color of the radial gradient
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Link strokes.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Base edge color
	pub color: Color,
	/// Stroke of the selected link
	pub selected_color: Color,
	/// Dash pattern of the selected link, in screen pixels
	pub selected_dash: [f64; 2],
}

/// Node fill and outline.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Border/stroke width in screen pixels (0 = no border)
	pub border_width: f64,
	/// Border color
	pub border_color: Color,
	/// Label text color
	pub label_color: Color,
}

/// Selection and pin markers.
#[derive(Clone, Debug)]
pub struct SelectionStyle {
	/// Ring drawn around the selected node
	pub ring_color: Color,
	/// Dot drawn on pinned nodes
	pub pin_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Theme identifier.
	pub name: &'static str,
	/// Canvas background.
	pub background: BackgroundStyle,
	/// Link strokes.
	pub edge: EdgeStyle,
	/// Node fill and outline.
	pub node: NodeStyle,
	/// Selection and pin markers.
	pub selection: SelectionStyle,
	/// Fallback node colors.
	pub palette: NodePalette,
}

impl Theme {
	/// Clean dark theme (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.5),
				selected_color: Color::rgb(236, 196, 104),
				selected_dash: [6.0, 4.0],
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				label_color: Color::rgba(220, 225, 232, 0.85),
			},
			selection: SelectionStyle {
				ring_color: Color::rgb(236, 196, 104),
				pin_color: Color::rgba(255, 255, 255, 0.7),
			},
			palette: NodePalette::slate(),
		}
	}

	/// Darker background with purple accents
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(25, 28, 38),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(100, 120, 150, 0.45),
				selected_color: Color::rgb(190, 160, 230),
				selected_dash: [6.0, 4.0],
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				label_color: Color::rgba(210, 210, 230, 0.85),
			},
			selection: SelectionStyle {
				ring_color: Color::rgb(190, 160, 230),
				pin_color: Color::rgba(255, 255, 255, 0.6),
			},
			palette: NodePalette::aurora(),
		}
	}

	/// Flat light theme without gradients
	pub fn minimal() -> Self {
		Self {
			name: "minimal",
			background: BackgroundStyle {
				color: Color::rgb(248, 248, 246),
				color_secondary: Color::rgb(248, 248, 246),
				use_gradient: false,
			},
			edge: EdgeStyle {
				color: Color::rgba(90, 100, 115, 0.5),
				selected_color: Color::rgb(200, 90, 60),
				selected_dash: [4.0, 3.0],
			},
			node: NodeStyle {
				use_gradient: false,
				border_width: 1.0,
				border_color: Color::rgba(60, 60, 70, 0.6),
				label_color: Color::rgb(50, 55, 65),
			},
			selection: SelectionStyle {
				ring_color: Color::rgb(200, 90, 60),
				pin_color: Color::rgba(40, 40, 40, 0.7),
			},
			palette: NodePalette::pastel(),
		}
	}

	/// Looks a theme up by its name.
	pub fn named(name: &str) -> Option<Self> {
		match name {
			"default" => Some(Self::default_theme()),
			"midnight" => Some(Self::midnight()),
			"minimal" => Some(Self::minimal()),
			_ => None,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
