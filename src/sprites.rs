//! Read-only catalog of pixel-art sprites and the bounded cache of their
//! rasterized images.

use crate::raster::{hex, Canvas, Rgb};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Decorative entry that is drawn elsewhere and never spawned by input
pub const RESERVED: &str = "koelreuteria";

/// Rasterized images kept before the oldest is dropped
pub const CACHE_CAPACITY: usize = 50;

/// Palette-index grid; digit `0` is transparent
#[derive(Debug)]
pub struct PixelGrid {
    pub rows: &'static [&'static str],
    pub colors: &'static [(u8, Rgb)],
}

impl PixelGrid {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn color(&self, index: u8) -> Option<Rgb> {
        self.colors.iter().find(|(i, _)| *i == index).map(|(_, c)| *c)
    }

    /// Non-transparent cells as (col, row, palette index)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.bytes().enumerate().filter_map(move |(col, b)| {
                let index = b.wrapping_sub(b'0');
                (index != 0 && index <= 9).then_some((col, row, index))
            })
        })
    }

    /// Draw every cell as a `scale`-sized block. Indices missing from the
    /// colour table fall back to white.
    pub fn rasterize(&self, scale: u32) -> Canvas {
        let s = scale.max(1) as usize;
        let mut canvas = Canvas::new(self.width() * s, self.height() * s);
        for (col, row, index) in self.cells() {
            let color = self.color(index).unwrap_or(Rgb::WHITE);
            for dy in 0..s {
                for dx in 0..s {
                    canvas.put((col * s + dx) as i32, (row * s + dy) as i32, color);
                }
            }
        }
        canvas
    }
}

#[derive(Debug)]
pub struct SpriteDef {
    pub name: &'static str,
    pub grid: PixelGrid,
}

pub fn lookup(name: &str) -> Option<&'static SpriteDef> {
    CATALOG.iter().find(|def| def.name == name)
}

/// Names that input bursts may pop out
pub fn spawnable() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|def| def.name).filter(|name| *name != RESERVED)
}

/// Rasterize a catalog entry; unknown names yield `None`
pub fn rasterize(name: &str, scale: u32) -> Option<Canvas> {
    lookup(name).map(|def| def.grid.rasterize(scale))
}

type CacheKey = (&'static str, u32);

/// Rasterized sprites keyed by (name, scale) with insertion-order eviction
pub struct SpriteCache {
    capacity: usize,
    order: VecDeque<CacheKey>,
    images: HashMap<CacheKey, Rc<Canvas>>,
}

impl SpriteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            images: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str, scale: u32) -> bool {
        self.order.iter().any(|(n, s)| *n == name && *s == scale)
    }

    /// Cached image for `name` at `scale`, rasterizing on a miss.
    /// A hit does not refresh the entry's age.
    pub fn get(&mut self, name: &str, scale: u32) -> Option<Rc<Canvas>> {
        let def = lookup(name)?;
        let key = (def.name, scale);
        if let Some(image) = self.images.get(&key) {
            return Some(Rc::clone(image));
        }

        let image = Rc::new(rasterize(def.name, scale)?);
        self.images.insert(key, Rc::clone(&image));
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.images.remove(&oldest);
            }
        }
        Some(image)
    }
}

impl Default for SpriteCache {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY)
    }
}

static CATALOG: &[SpriteDef] = &[
    SpriteDef {
        name: "bear",
        grid: PixelGrid {
            rows: &[
                "0011000000110000",
                "0122100001221000",
                "0111111111111000",
                "0111111111111000",
                "0113111111311000",
                "0111122221111000",
                "0111123321111000",
                "0111122221111000",
                "0111111111111000",
                "0011112211110000",
                "0001111111100000",
                "0000111111000000",
                "0011000000110000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFF99CC)), (2, hex(0xFFCCDD)), (3, hex(0x000000))],
        },
    },
    SpriteDef {
        name: "elmo",
        grid: PixelGrid {
            rows: &[
                "0000011110000000",
                "0000111111000000",
                "0001111111100000",
                "0012211112210000",
                "0012311112310000",
                "0011114411110000",
                "0011144441110000",
                "0011114411110000",
                "0011113311110000",
                "0001133331100000",
                "0001111111100000",
                "0000111111000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFF0000)), (2, hex(0xFFFFFF)), (3, hex(0x000000)), (4, hex(0xFF9900))],
        },
    },
    SpriteDef {
        name: "carrots",
        grid: PixelGrid {
            rows: &[
                "0000000000000000",
                "0002002002000000",
                "0002202202200000",
                "0001101101100000",
                "0001101101100000",
                "0001101101100000",
                "0033333333330000",
                "0033333333330000",
                "0003333333300000",
                "0003333333300000",
                "0003333333300000",
                "0003333333300000",
                "0000333333000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFF7700)), (2, hex(0x00AA00)), (3, hex(0x884400))],
        },
    },
    SpriteDef {
        name: "hotcakes",
        grid: PixelGrid {
            rows: &[
                "0000000000000000",
                "0000000440000000",
                "0000000440000000",
                "0000002222000000",
                "0000222222220000",
                "0001111111111000",
                "0011111111111100",
                "0001111111111000",
                "0002200000020000",
                "0001111111111000",
                "0011111111111100",
                "0001111111111000",
                "0000111111110000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xEECC88)), (2, hex(0xAA5500)), (4, hex(0xFFFFAA))],
        },
    },
    SpriteDef {
        name: "eggs",
        grid: PixelGrid {
            rows: &[
                "0000000000000000",
                "0000000000000000",
                "0001100111000000",
                "0011111111110000",
                "0112211112211000",
                "0112211122221000",
                "0111111122221000",
                "0011111112211000",
                "0001111111110000",
                "0000011111100000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFFFFFF)), (2, hex(0xFFCC00))],
        },
    },
    SpriteDef {
        name: "padelball",
        grid: PixelGrid {
            rows: &[
                "0000000000000000",
                "0000011111000000",
                "0001111111110000",
                "0011111111111000",
                "0111111111111100",
                "0111111111111100",
                "0111111112111100",
                "0111111122211100",
                "0111111111111100",
                "0011111111111000",
                "0001111111110000",
                "0000011111000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xCCFF00)), (2, hex(0x000000))],
        },
    },
    SpriteDef {
        name: "racket",
        grid: PixelGrid {
            rows: &[
                "0000011111000000",
                "0000111111100000",
                "0001121212110000",
                "0011222222211000",
                "0011112121211000",
                "0011212121211000",
                "0001111111110000",
                "0000111111100000",
                "0000011133000000",
                "0000001330000000",
                "0000004440000000",
                "0000004440000000",
                "0000004440000000",
                "0000004440000000",
                "0000004440000000",
                "0000001110000000",
            ],
            colors: &[(1, hex(0x0066CC)), (2, hex(0xFFFFFF)), (3, hex(0xFF5500)), (4, hex(0x4488FF))],
        },
    },
    SpriteDef {
        name: "lola",
        grid: PixelGrid {
            rows: &[
                "01000111010001000",
                "01000101010001110",
                "01110111011101010",
                "0000000000000000",
                "0000011111000000",
                "0040111111104000",
                "0040131113104000",
                "0000111111100000",
                "0000222222200000",
                "0000232223200000",
                "0001111111111000",
                "0001133111113300",
                "0001133111113300",
                "0001111111111100",
                "0000110000011000",
                "0000110000011000",
            ],
            colors: &[(1, hex(0x000000)), (2, hex(0xFFCCDD)), (3, hex(0xFFFFFF)), (4, hex(0xFF9999))],
        },
    },
    SpriteDef {
        name: "avocado",
        grid: PixelGrid {
            rows: &[
                "0000000010000000",
                "0000001111100000",
                "0000011111110000",
                "0000011222110000",
                "0000012222210000",
                "0000112222211000",
                "0000122222221000",
                "0000122333221000",
                "0001122333221100",
                "0001222333222100",
                "0001222222222100",
                "0001122222221100",
                "0000111222111000",
                "0000011111110000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0x006600)), (2, hex(0xCCFF66)), (3, hex(0x663300))],
        },
    },
    SpriteDef {
        name: "tortilla",
        grid: PixelGrid {
            rows: &[
                "0000001111000000",
                "0001111111110000",
                "0011112111111000",
                "0111111111111100",
                "0112111111211100",
                "1111111111111110",
                "1111111111111110",
                "1111112111111110",
                "1111111111111110",
                "0111111111111100",
                "0111111121111100",
                "0011111111111000",
                "0001111111110000",
                "0000001111000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xF4E0A0)), (2, hex(0xC4A060))],
        },
    },
    SpriteDef {
        name: "spaniel",
        grid: PixelGrid {
            rows: &[
                "0000001111000000",
                "0000011111100000",
                "0002211111122000",
                "0002213113122000",
                "0002211111122000",
                "0002211331122000",
                "0000011111100000",
                "0000011111100000",
                "0002211111122000",
                "0022111111112200",
                "0011111111111100",
                "0011111111111100",
                "0011000000110000",
                "0011000000110000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFFFFFF)), (2, hex(0x663300)), (3, hex(0x000000))],
        },
    },
    SpriteDef {
        name: "ladder",
        grid: PixelGrid {
            rows: &[
                "0001000000001000",
                "0001000000001000",
                "0001111111111000",
                "0001000000001000",
                "0001000000001000",
                "0001111111111000",
                "0001000000001000",
                "0001000000001000",
                "0001111111111000",
                "0001000000001000",
                "0001000000001000",
                "0001111111111000",
                "0001000000001000",
                "0001000000001000",
                "0001000000001000",
                "0001000000001000",
            ],
            colors: &[(1, hex(0x8B4513))],
        },
    },
    SpriteDef {
        name: "train",
        grid: PixelGrid {
            rows: &[
                "0000000000111100",
                "0000000000122100",
                "0000010000111100",
                "0000111000111100",
                "0000111111111100",
                "0100111111111100",
                "1111111111111100",
                "0000000111111100",
                "0011000000110000",
                "0133100001331000",
                "0133100001331000",
                "0011000000110000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xCC0000)), (2, hex(0x88CCFF)), (3, hex(0x000000))],
        },
    },
    SpriteDef {
        name: "moon",
        grid: PixelGrid {
            rows: &[
                "0000011111100000",
                "0001111111111000",
                "0011111111111100",
                "0111221111111110",
                "0112221111121110",
                "1111211111222111",
                "1111111121121111",
                "1111111222111111",
                "1111111121111111",
                "1121111111111211",
                "0122111111112210",
                "0112111221111210",
                "0011112222111100",
                "0001111221111000",
                "0000111111110000",
                "0000001111000000",
            ],
            colors: &[(1, hex(0xF4F6F0)), (2, hex(0xE0E0E0))],
        },
    },
    SpriteDef {
        name: "koelreuteria",
        grid: PixelGrid {
            rows: &[
                "00000000000055775500000000000000",
                "00000000057733553377500000000000",
                "00000000733223333223370000000000",
                "00000088322335555332238800000000",
                "00000883233577557753323880000000",
                "00007732337733223377332377000000",
                "00073323355322332235533233700000",
                "00883233773233333323773323880000",
                "05532335532338888332355332355000",
                "07323377323388338833237733237000",
                "53233553233883223883323553323500",
                "73337732335532332355332377333700",
                "83233323377323333237733233323800",
                "73322335773233223323775332233700",
                "53233377532333333332357733323500",
                "83323883323353333533233883233800",
                "07338832335773223775332388337000",
                "05333773357732332377533773335000",
                "00833355773323333233775533380000",
                "00073337732333113332377333700000",
                "00005533323333113333233355000000",
                "00000077333831111383337700000000",
                "00000000000001111000000000000000",
                "00000000000011661100000000000000",
                "00000000000016116100000000000000",
                "00000000000011111100000000000000",
                "00000000000011111100000000000000",
                "00000000000011111100000000000000",
                "00000000000116116110000000000000",
                "00000000001160110611000000000000",
                "00000000011000000001100000000000",
                "00000000000000000000000000000000",
            ],
            colors: &[(1, hex(0x5C3317)), (2, hex(0x1B5E20)), (3, hex(0x2E7D32)), (5, hex(0xFFD700)), (6, hex(0x3E2723)), (7, hex(0xE8830C)), (8, hex(0xD4566A))],
        },
    },
    SpriteDef {
        name: "cat",
        grid: PixelGrid {
            rows: &[
                "0010000000100000",
                "0111000001110000",
                "0111111111110000",
                "0112111112110000",
                "0111113111110000",
                "0011111111100000",
                "0001111111000000",
                "0011111111100000",
                "0111111111110000",
                "0111111111110000",
                "0111111111110000",
                "0011000001100000",
                "0011000001100000",
                "0000000000004400",
                "0000000000044000",
                "0000000000440000",
            ],
            colors: &[(1, hex(0xFF8800)), (2, hex(0x33CC33)), (3, hex(0xFF6699)), (4, hex(0xFF8800))],
        },
    },
    SpriteDef {
        name: "santa",
        grid: PixelGrid {
            rows: &[
                "0000002220000000",
                "0000021112000000",
                "0000211111200000",
                "0002222222220000",
                "0003333333330000",
                "0003433334330000",
                "0003333133330000",
                "0022222222222000",
                "0002222222220000",
                "0000111111100000",
                "0000115551100000",
                "0000111111100000",
                "0000111111100000",
                "0000440004400000",
                "0000440004400000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xCC0000)), (2, hex(0xFFFFFF)), (3, hex(0xFFCC99)), (4, hex(0x000000)), (5, hex(0xFFD700))],
        },
    },
    SpriteDef {
        name: "apple",
        grid: PixelGrid {
            rows: &[
                "0000002000000000",
                "0000022330000000",
                "0000111111000000",
                "0001111111100000",
                "0011111111110000",
                "0011111111110000",
                "0111111111111000",
                "0111111111111000",
                "0111111111111000",
                "0111111111111000",
                "0011111111110000",
                "0011111111110000",
                "0001111111100000",
                "0000111111000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xCC0000)), (2, hex(0x663300)), (3, hex(0x00AA00))],
        },
    },
    SpriteDef {
        name: "banana",
        grid: PixelGrid {
            rows: &[
                "0000000002000000",
                "0000000012000000",
                "0000000110000000",
                "0000001110000000",
                "0000011100000000",
                "0000111000000000",
                "0001111000000000",
                "0011110000000000",
                "0111100000000000",
                "0111100000000000",
                "0011100000000000",
                "0001110000000000",
                "0000110000000000",
                "0000020000000000",
                "0000000000000000",
                "0000000000000000",
            ],
            colors: &[(1, hex(0xFFD700)), (2, hex(0x8B6914))],
        },
    },
];

#[cfg(test)]
mod tests {
    use super::{lookup, rasterize, spawnable, SpriteCache, RESERVED};
    use std::rc::Rc;

    #[test]
    fn reserved_entry_is_never_spawnable() {
        assert!(lookup(RESERVED).is_some());
        assert!(spawnable().all(|name| name != RESERVED));
        assert_eq!(spawnable().count(), 18);
    }

    #[test]
    fn unknown_name_is_a_silent_miss() {
        assert!(rasterize("unicorn", 2).is_none());
        let mut cache = SpriteCache::new(4);
        assert!(cache.get("unicorn", 1).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn rasterize_scales_grid() {
        let img = rasterize("bear", 3).expect("bear exists");
        assert_eq!((img.width(), img.height()), (48, 48));
        // Ear pixel at grid (2, 0)
        assert!(img.get(6, 0).is_some());
        assert!(img.get(0, 0).is_none());
    }

    #[test]
    fn hits_share_the_same_image() {
        let mut cache = SpriteCache::new(4);
        let a = cache.get("cat", 2).unwrap();
        let b = cache.get("cat", 2).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_follows_insertion_order_not_use() {
        let mut cache = SpriteCache::new(2);
        cache.get("cat", 1);
        cache.get("moon", 1);
        // Touching the oldest does not save it
        cache.get("cat", 1);
        cache.get("apple", 1);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("cat", 1));
        assert!(cache.contains("moon", 1));
        assert!(cache.contains("apple", 1));
    }

    #[test]
    fn scale_is_part_of_the_key() {
        let mut cache = SpriteCache::new(10);
        cache.get("eggs", 1);
        cache.get("eggs", 2);
        assert_eq!(cache.len(), 2);
    }
}
