use super::graph::{LightType, SceneLightData};

/// Number of light slots the Phong shader evaluates.
pub const MAX_LIGHTS: usize = 8;

/// Light kind as seen by the shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
    #[default]
    Disabled,
}

impl LightKind {
    /// Integer code written into [`LightUniform::kind`].
    pub const fn code(self) -> i32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
            LightKind::Disabled => -1,
        }
    }
}

impl From<LightType> for LightKind {
    fn from(kind: LightType) -> Self {
        match kind {
            LightType::Directional => LightKind::Directional,
            LightType::Point => LightKind::Point,
            LightType::Spot => LightKind::Spot,
        }
    }
}

/// One light slot, laid out for a WGSL uniform array.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub color: [f32; 4],
    pub position: [f32; 3],
    pub penumbra: f32,
    pub direction: [f32; 4],
    pub attenuation: [f32; 3],
    pub angle: f32,
    pub kind: i32,
    pub _padding: [i32; 3],
}

impl LightUniform {
    pub const DISABLED: Self = Self {
        color: [0.0; 4],
        position: [0.0; 3],
        penumbra: 0.0,
        direction: [0.0; 4],
        attenuation: [0.0; 3],
        angle: 0.0,
        kind: -1,
        _padding: [0; 3],
    };

    pub fn kind(&self) -> LightKind {
        match self.kind {
            0 => LightKind::Directional,
            1 => LightKind::Point,
            2 => LightKind::Spot,
            _ => LightKind::Disabled,
        }
    }
}

impl From<&SceneLightData> for LightUniform {
    fn from(light: &SceneLightData) -> Self {
        Self {
            color: light.color.to_array(),
            position: light.position.truncate().to_array(),
            penumbra: light.penumbra,
            direction: light.direction.to_array(),
            attenuation: light.attenuation.to_array(),
            angle: light.angle,
            kind: LightKind::from(light.kind).code(),
            _padding: [0; 3],
        }
    }
}

/// Fixed array of light slots; slots past the scene's lights stay disabled.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightSlots {
    pub slots: [LightUniform; MAX_LIGHTS],
}

impl Default for LightSlots {
    fn default() -> Self {
        Self {
            slots: [LightUniform::DISABLED; MAX_LIGHTS],
        }
    }
}

impl LightSlots {
    /// Fills slots from world-space lights, dropping any past [`MAX_LIGHTS`].
    pub fn from_lights(lights: &[SceneLightData]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "scene has {} lights, only the first {MAX_LIGHTS} are used",
                lights.len()
            );
        }
        let mut slots = Self::default();
        for (slot, light) in slots.slots.iter_mut().zip(lights) {
            *slot = light.into();
        }
        slots
    }

    pub fn active(&self) -> impl Iterator<Item = &LightUniform> {
        self.slots
            .iter()
            .filter(|slot| slot.kind() != LightKind::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn light(kind: LightType) -> SceneLightData {
        SceneLightData {
            id: 0,
            kind,
            color: Vec4::ONE,
            attenuation: Vec3::new(1.0, 0.1, 0.01),
            position: Vec4::new(1.0, 2.0, 3.0, 1.0),
            direction: Vec4::new(0.0, -1.0, 0.0, 0.0),
            penumbra: 0.2,
            angle: 0.6,
        }
    }

    #[test]
    fn layout_matches_shader_struct() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightSlots>(), 80 * MAX_LIGHTS);
    }

    #[test]
    fn unused_slots_are_disabled() {
        let slots = LightSlots::from_lights(&[light(LightType::Spot)]);
        assert_eq!(slots.slots[0].kind, 2);
        assert_eq!(slots.slots[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(slots.slots[0].angle, 0.6);
        assert!(slots.slots[1..].iter().all(|s| s.kind == -1));
        assert_eq!(slots.active().count(), 1);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let lights: Vec<_> = (0..11).map(|_| light(LightType::Point)).collect();
        let slots = LightSlots::from_lights(&lights);
        assert_eq!(slots.active().count(), MAX_LIGHTS);
    }

    #[test]
    fn kind_codes() {
        assert_eq!(LightKind::from(LightType::Directional).code(), 0);
        assert_eq!(LightKind::from(LightType::Point).code(), 1);
        assert_eq!(LightKind::Spot.code(), 2);
        assert_eq!(LightKind::Disabled.code(), -1);
    }
}
