//! Flat colors of the robot and the world objects.

/// RGBA color, components in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    /// Color from 0..255 channels and 0..1 alpha.
    pub fn from_rgb(r: u8, g: u8, b: u8, a: f32) -> Self {
        Rgba([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a])
    }

    pub fn r(&self) -> f32 { self.0[0] }
    pub fn g(&self) -> f32 { self.0[1] }
    pub fn b(&self) -> f32 { self.0[2] }
    pub fn a(&self) -> f32 { self.0[3] }
}

/// Which palette entry a shape is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Torso,
    Neck,
    Head,
    Eye,
    EyeInner,
    Shoulder,
    Arm,
    Wrist,
    Hand,
    Claw,
    Tread,
    Trash,
    TrashCan,
    ChargingStation,
    GaugeBar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub torso: Rgba,
    pub neck: Rgba,
    pub head: Rgba,
    pub eye: Rgba,
    pub eye_inner: Rgba,
    pub shoulder: Rgba,
    pub arm: Rgba,
    pub wrist: Rgba,
    pub hand: Rgba,
    pub claw: Rgba,
    pub tread: Rgba,
    pub trash: Rgba,
    pub trash_can: Rgba,
    pub charging_station: Rgba,
    pub gauge_bar: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            torso: Rgba::from_rgb(248, 175, 58, 1.0),
            neck: Rgba::from_rgb(128, 77, 26, 1.0),
            head: Rgba::from_rgb(117, 117, 116, 1.0),
            eye: Rgba::from_rgb(89, 83, 73, 1.0),
            eye_inner: Rgba::from_rgb(255, 255, 255, 1.0),
            shoulder: Rgba::from_rgb(117, 117, 116, 1.0),
            arm: Rgba::from_rgb(248, 175, 58, 1.0),
            wrist: Rgba::from_rgb(153, 153, 153, 1.0),
            hand: Rgba::from_rgb(117, 117, 116, 1.0),
            claw: Rgba::from_rgb(102, 102, 102, 1.0),
            tread: Rgba::from_rgb(102, 102, 102, 1.0),
            trash: Rgba::from_rgb(72, 0, 255, 1.0),
            trash_can: Rgba::from_rgb(40, 40, 40, 0.6),
            charging_station: Rgba::from_rgb(76, 216, 21, 1.0),
            gauge_bar: Rgba::from_rgb(76, 216, 21, 1.0),
        }
    }
}

impl Palette {
    /// Palette shown while the battery is low: torso, arms and neck go black.
    pub fn depleted() -> Self {
        let black = Rgba::from_rgb(0, 0, 0, 1.0);
        Palette {
            torso: black,
            arm: black,
            neck: black,
            ..Palette::default()
        }
    }

    pub fn color(&self, role: ColorRole) -> Rgba {
        match role {
            ColorRole::Torso => self.torso,
            ColorRole::Neck => self.neck,
            ColorRole::Head => self.head,
            ColorRole::Eye => self.eye,
            ColorRole::EyeInner => self.eye_inner,
            ColorRole::Shoulder => self.shoulder,
            ColorRole::Arm => self.arm,
            ColorRole::Wrist => self.wrist,
            ColorRole::Hand => self.hand,
            ColorRole::Claw => self.claw,
            ColorRole::Tread => self.tread,
            ColorRole::Trash => self.trash,
            ColorRole::TrashCan => self.trash_can,
            ColorRole::ChargingStation => self.charging_station,
            ColorRole::GaugeBar => self.gauge_bar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depleted_only_blackens_body() {
        let normal = Palette::default();
        let depleted = Palette::depleted();
        assert_eq!(depleted.color(ColorRole::Torso), Rgba([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(depleted.color(ColorRole::Arm), Rgba([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(depleted.color(ColorRole::Neck), Rgba([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(depleted.color(ColorRole::Head), normal.color(ColorRole::Head));
        assert_eq!(depleted.color(ColorRole::Trash), normal.color(ColorRole::Trash));
    }

    #[test]
    fn test_trash_can_is_translucent() {
        assert_eq!(Palette::default().trash_can.a(), 0.6);
    }
}
