use crate::raster::{hex, Rgb};
use rand::prelude::*;

/// Decorative palettes burst particles pick from (neon, pastel, americana, earth)
pub const DECOR_PALETTES: [[Rgb; 5]; 4] = [
    [hex(0xFF0055), hex(0xFF7700), hex(0xFFDD00), hex(0x00FF55), hex(0x0077FF)],
    [hex(0xFF99C8), hex(0xFCF6BD), hex(0xD0F4DE), hex(0xA9DEF9), hex(0xE4C1F9)],
    [hex(0xE63946), hex(0xF1FAEE), hex(0xA8DADC), hex(0x457B9D), hex(0x1D3557)],
    [hex(0x264653), hex(0x2A9D8F), hex(0xE9C46A), hex(0xF4A261), hex(0xE76F51)],
];

/// Falling petal tints
pub const PETALS: [Rgb; 5] = [
    hex(0xFFD700),
    hex(0xFFC107),
    hex(0xFFAB00),
    hex(0xFFE082),
    hex(0xF9A825),
];

/// Bark, darkest first
pub const TRUNK: [Rgb; 4] = [hex(0x3E2723), hex(0x4E342E), hex(0x5D4037), hex(0x5C3317)];
pub const ROOTS: [Rgb; 2] = [hex(0x3E2723), hex(0x5D4037)];

/// Dust thrown up when the cleaner catches something
pub const POOF: [Rgb; 4] = [hex(0xFFFFFF), hex(0xCCCCCC), hex(0x888888), hex(0x663300)];

pub const GOLD: Rgb = hex(0xFFD700);

/// Random colour from a random decorative palette
pub fn random_decor(rng: &mut StdRng) -> Rgb {
    let palette = &DECOR_PALETTES[rng.gen_range(0..DECOR_PALETTES.len())];
    palette[rng.gen_range(0..palette.len())]
}

/// Uniform pick from a non-empty colour list
pub fn pick(rng: &mut StdRng, colors: &[Rgb]) -> Rgb {
    colors.choose(rng).copied().unwrap_or(Rgb::WHITE)
}

#[cfg(test)]
mod tests {
    use super::{pick, random_decor, DECOR_PALETTES, PETALS};
    use rand::prelude::*;

    #[test]
    fn decor_colours_come_from_palettes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let c = random_decor(&mut rng);
            assert!(DECOR_PALETTES.iter().any(|p| p.contains(&c)));
        }
    }

    #[test]
    fn pick_stays_in_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(PETALS.contains(&pick(&mut rng, &PETALS)));
    }
}
