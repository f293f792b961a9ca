//! Item-attached compact appearance snapshot.
//!
//! A trimmed copy of a player's breast settings, serialized as a CBOR map
//! under the single reserved `"silhouette"` key so it can ride inside a
//! foreign item tag next to fields owned by other systems. Consumers must
//! tolerate the reserved key being absent entirely: that means no
//! customization is present.

use std::convert::Infallible;

use minicbor::data::Type;
use minicbor::encode::Error as EncodeError;
use minicbor::{Decoder, Encoder};

use crate::config::character::keys;
use crate::entity::breasts::Breasts;
use crate::entity::player::PlayerConfig;

/// The one top-level tag field this crate owns.
pub const RESERVED_KEY: &str = "silhouette";

/// Decoded snapshot contents. Floats are clamped to the owning key's bound
/// on decode, so a hostile tag cannot smuggle out-of-range values in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreastSnapshot {
    pub breast_size: f32,
    pub cleavage: f32,
    pub jacket: bool,
    pub offsets: [f32; 3],
}

impl BreastSnapshot {
    /// Capture a snapshot from a player, or `None` when there is nothing to
    /// show: the gender has no breasts or armor display is turned off.
    pub fn from_player(player: &PlayerConfig, jacket_visible: bool) -> Option<Self> {
        if !player.gender().can_have_breasts() || !player.show_in_armor() {
            return None;
        }
        let breasts = player.breasts();
        Some(Self {
            breast_size: player.bust_size(),
            cleavage: breasts.cleavage,
            jacket: jacket_visible,
            offsets: breasts.offset,
        })
    }

    pub fn breasts(&self) -> Breasts {
        Breasts {
            offset: self.offsets,
            uniboob: true,
            cleavage: self.cleavage,
        }
    }

    /// Serialize under the reserved key.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.encode_into(&mut Encoder::new(&mut buf));
        buf
    }

    fn encode_into(
        &self,
        enc: &mut Encoder<&mut Vec<u8>>,
    ) -> Result<(), EncodeError<Infallible>> {
        enc.map(1)?;
        enc.str(RESERVED_KEY)?;
        enc.map(6)?;
        enc.str("BreastSize")?;
        enc.f32(self.breast_size)?;
        enc.str("Cleavage")?;
        enc.f32(self.cleavage)?;
        enc.str("Jacket")?;
        enc.bool(self.jacket)?;
        enc.str("XOffset")?;
        enc.f32(self.offsets[0])?;
        enc.str("YOffset")?;
        enc.f32(self.offsets[1])?;
        enc.str("ZOffset")?;
        enc.f32(self.offsets[2])?;
        Ok(())
    }

    /// Parse a foreign tag. `None` when the reserved key is absent or the
    /// payload is malformed; unknown fields at either level are skipped.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let mut dec = Decoder::new(bytes);
        let outer_len = dec.map().ok()??;
        for _ in 0..outer_len {
            let key = dec.str().ok()?;
            if key == RESERVED_KEY {
                return Self::decode_fields(&mut dec);
            }
            dec.skip().ok()?;
        }
        None
    }

    fn decode_fields(dec: &mut Decoder) -> Option<Self> {
        let mut snapshot = Self {
            breast_size: 0.0,
            cleavage: keys::BREASTS_CLEAVAGE.clamp(0.0),
            jacket: true,
            offsets: [0.0; 3],
        };
        let len = dec.map().ok()??;
        for _ in 0..len {
            match dec.str().ok()? {
                "BreastSize" => snapshot.breast_size = keys::BUST_SIZE.clamp(decode_f32(dec)?),
                "Cleavage" => snapshot.cleavage = keys::BREASTS_CLEAVAGE.clamp(decode_f32(dec)?),
                "Jacket" => snapshot.jacket = dec.bool().ok()?,
                "XOffset" => snapshot.offsets[0] = keys::BREASTS_X_OFFSET.clamp(decode_f32(dec)?),
                "YOffset" => snapshot.offsets[1] = keys::BREASTS_Y_OFFSET.clamp(decode_f32(dec)?),
                "ZOffset" => snapshot.offsets[2] = keys::BREASTS_Z_OFFSET.clamp(decode_f32(dec)?),
                _ => dec.skip().ok()?,
            }
        }
        Some(snapshot)
    }
}

fn decode_f32(dec: &mut Decoder) -> Option<f32> {
    match dec.datatype().ok()? {
        Type::F16 => dec.f16().ok(),
        Type::F32 => dec.f32().ok(),
        Type::F64 => dec.f64().ok().map(|v| v as f32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BreastSnapshot {
        BreastSnapshot {
            breast_size: 0.45,
            cleavage: 0.05,
            jacket: false,
            offsets: [0.25, -0.5, -0.125],
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let snapshot = sample();
        assert_eq!(BreastSnapshot::decode(&snapshot.encode()), Some(snapshot));
    }

    #[test]
    fn absent_reserved_key_is_no_customization() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        enc.map(1).unwrap();
        enc.str("SomeOtherMod").unwrap();
        enc.u32(7).unwrap();
        assert_eq!(BreastSnapshot::decode(&buf), None);
    }

    #[test]
    fn garbage_bytes_decode_to_none() {
        assert_eq!(BreastSnapshot::decode(&[0xff, 0x00, 0x13]), None);
        assert_eq!(BreastSnapshot::decode(&[]), None);
    }

    #[test]
    fn decode_clamps_to_key_bounds() {
        let oversized = BreastSnapshot {
            breast_size: 0.8,
            cleavage: 0.1,
            jacket: true,
            offsets: [1.0, 1.0, 0.0],
        };
        // Hand-build a payload with out-of-range floats.
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        enc.map(1).unwrap();
        enc.str(RESERVED_KEY).unwrap();
        enc.map(6).unwrap();
        enc.str("BreastSize").unwrap();
        enc.f32(12.0).unwrap();
        enc.str("Cleavage").unwrap();
        enc.f32(0.5).unwrap();
        enc.str("Jacket").unwrap();
        enc.bool(true).unwrap();
        enc.str("XOffset").unwrap();
        enc.f32(3.0).unwrap();
        enc.str("YOffset").unwrap();
        enc.f32(2.0).unwrap();
        enc.str("ZOffset").unwrap();
        enc.f32(1.0).unwrap();
        assert_eq!(BreastSnapshot::decode(&buf), Some(oversized));
    }

    #[test]
    fn unknown_inner_fields_are_skipped() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        enc.map(1).unwrap();
        enc.str(RESERVED_KEY).unwrap();
        enc.map(2).unwrap();
        enc.str("BreastSize").unwrap();
        enc.f32(0.3).unwrap();
        enc.str("FutureField").unwrap();
        enc.str("whatever").unwrap();
        let snapshot = BreastSnapshot::decode(&buf).expect("decodes");
        assert_eq!(snapshot.breast_size, 0.3);
        assert!(snapshot.jacket);
    }

    #[test]
    fn from_player_requires_breasts_shown_in_armor() {
        use crate::config::Gender;
        use uuid::Uuid;

        let dir = tempfile::tempdir().expect("tempdir");
        let mut player = PlayerConfig::new(Uuid::new_v4(), dir.path());
        assert_eq!(BreastSnapshot::from_player(&player, true), None);

        player.set_gender(Gender::Female).unwrap();
        player.set_bust_size(0.7).unwrap();
        let snapshot = BreastSnapshot::from_player(&player, false).expect("snapshot");
        assert_eq!(snapshot.breast_size, 0.7);
        assert!(!snapshot.jacket);

        player.set_show_in_armor(false).unwrap();
        assert_eq!(BreastSnapshot::from_player(&player, true), None);
    }

    #[test]
    fn foreign_sibling_keys_are_tolerated() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        enc.map(2).unwrap();
        enc.str("SomeOtherMod").unwrap();
        enc.map(1).unwrap();
        enc.str("inner").unwrap();
        enc.u8(1).unwrap();
        enc.str(RESERVED_KEY).unwrap();
        enc.map(1).unwrap();
        enc.str("BreastSize").unwrap();
        enc.f32(0.5).unwrap();
        let snapshot = BreastSnapshot::decode(&buf).expect("decodes");
        assert_eq!(snapshot.breast_size, 0.5);
    }
}
