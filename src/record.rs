//! Wine record representation and the fixed 80-byte record codec.
//!
//! Layout (big-endian throughout):
//!
//! | bytes  | field    | encoding                     |
//! |--------|----------|------------------------------|
//! | 0..4   | id       | i32                          |
//! | 4..34  | estate   | 15 UTF-16 units, space-padded |
//! | 34..64 | grape    | 15 UTF-16 units, space-padded |
//! | 64..68 | year     | i32                          |
//! | 68..72 | quantity | i32                          |
//! | 72..80 | price    | f64                          |

use crate::config::{FIELD_UNITS, MIN_YEAR, RECORD_SIZE};
use crate::encoding;
use crate::error::{WineError, WineResult};
use crate::types::RecordId;

/// A stored wine entry. `id` always equals the record's block index.
#[derive(Clone, Debug, PartialEq)]
pub struct WineRecord {
    pub id: RecordId,
    pub estate: String,
    pub grape: String,
    pub year: i32,
    pub quantity: i32,
    pub price: f64,
}

impl WineRecord {
    /// Attach a store-assigned id to a validated draft.
    pub(crate) fn from_draft(id: RecordId, draft: WineDraft) -> Self {
        Self {
            id,
            estate: draft.estate,
            grape: draft.grape,
            year: draft.year,
            quantity: draft.quantity,
            price: draft.price,
        }
    }
}

/// User-entered wine fields without an id.
///
/// Drafts can only be built through [`WineDraft::new`], so every draft that
/// reaches the store has passed the range checks.
#[derive(Clone, Debug, PartialEq)]
pub struct WineDraft {
    estate: String,
    grape: String,
    year: i32,
    quantity: i32,
    price: f64,
}

impl WineDraft {
    /// Build a draft, checking year against the current calendar year.
    ///
    /// # Errors
    /// - [`WineError::Validation`] if `year` is outside `[1980, this year]`
    ///   or `quantity` is not positive.
    pub fn new(
        estate: impl Into<String>,
        grape: impl Into<String>,
        year: i32,
        quantity: i32,
        price: f64,
    ) -> WineResult<Self> {
        Self::new_as_of(estate, grape, year, quantity, price, current_year())
    }

    /// Same as [`WineDraft::new`] with an explicit notion of "this year".
    pub fn new_as_of(
        estate: impl Into<String>,
        grape: impl Into<String>,
        year: i32,
        quantity: i32,
        price: f64,
        current_year: i32,
    ) -> WineResult<Self> {
        validate_year(year, current_year)?;
        validate_quantity(quantity)?;
        Ok(Self {
            estate: estate.into(),
            grape: grape.into(),
            year,
            quantity,
            price,
        })
    }

    pub fn estate(&self) -> &str {
        &self.estate
    }

    pub fn grape(&self) -> &str {
        &self.grape
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

/// Current calendar year in the system time zone.
pub fn current_year() -> i32 {
    i32::from(jiff::Zoned::now().year())
}

/// Check a vintage against `[MIN_YEAR, current_year]`.
pub fn validate_year(year: i32, current_year: i32) -> WineResult<()> {
    if year < MIN_YEAR || year > current_year {
        return Err(WineError::validation(
            "year",
            format!("{} not in {}..={}", year, MIN_YEAR, current_year),
        ));
    }
    Ok(())
}

/// Check that a bottle count is strictly positive.
pub fn validate_quantity(quantity: i32) -> WineResult<()> {
    if quantity <= 0 {
        return Err(WineError::validation(
            "quantity",
            format!("{} must be positive", quantity),
        ));
    }
    Ok(())
}

/// Encode a record into its fixed on-disk form.
///
/// Text longer than [`FIELD_UNITS`] is truncated silently; this is lossy and
/// only logged. Use [`encode_record_strict`] to reject such records instead.
pub fn encode_record(record: &WineRecord) -> WineResult<[u8; RECORD_SIZE]> {
    let mut out = Vec::with_capacity(RECORD_SIZE);
    encoding::write_i32_be(&mut out, record.id.to_disk()?);
    if encoding::write_fixed_utf16(&mut out, &record.estate, FIELD_UNITS) {
        tracing::debug!(id = %record.id, estate = %record.estate, "estate truncated on encode");
    }
    if encoding::write_fixed_utf16(&mut out, &record.grape, FIELD_UNITS) {
        tracing::debug!(id = %record.id, grape = %record.grape, "grape truncated on encode");
    }
    encoding::write_i32_be(&mut out, record.year);
    encoding::write_i32_be(&mut out, record.quantity);
    encoding::write_f64_be(&mut out, record.price);

    out.try_into().map_err(|v: Vec<u8>| {
        WineError::corruption(
            "record.encode",
            format!("encoded {} bytes, expected {}", v.len(), RECORD_SIZE),
        )
    })
}

/// Encode a record, failing with [`WineError::FieldTooLong`] instead of
/// truncating a text field.
pub fn encode_record_strict(record: &WineRecord) -> WineResult<[u8; RECORD_SIZE]> {
    check_width("estate", &record.estate)?;
    check_width("grape", &record.grape)?;
    encode_record(record)
}

fn check_width(field: &'static str, value: &str) -> WineResult<()> {
    let units = encoding::utf16_len(value);
    if units > FIELD_UNITS {
        return Err(WineError::FieldTooLong {
            field,
            units,
            max: FIELD_UNITS,
        });
    }
    Ok(())
}

/// Decode one fixed-size block back into a record.
///
/// Range checks are not re-applied: a stored vintage stays readable.
pub fn decode_record(bytes: &[u8]) -> WineResult<WineRecord> {
    if bytes.len() != RECORD_SIZE {
        return Err(WineError::corruption(
            "record.len",
            format!("expected {} bytes got {}", RECORD_SIZE, bytes.len()),
        ));
    }
    let mut pos = 0;
    let id = RecordId::from_disk(encoding::read_i32_be(bytes, &mut pos)?)?;
    let estate = encoding::read_fixed_utf16(bytes, &mut pos, FIELD_UNITS)?;
    let grape = encoding::read_fixed_utf16(bytes, &mut pos, FIELD_UNITS)?;
    let year = encoding::read_i32_be(bytes, &mut pos)?;
    let quantity = encoding::read_i32_be(bytes, &mut pos)?;
    let price = encoding::read_f64_be(bytes, &mut pos)?;

    Ok(WineRecord {
        id,
        estate,
        grape,
        year,
        quantity,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oak_hill(id: u32) -> WineRecord {
        let draft = WineDraft::new_as_of("Oak Hill", "Merlot", 2015, 12, 24.5, 2026).unwrap();
        WineRecord::from_draft(RecordId(id), draft)
    }

    #[test]
    fn encoded_record_is_eighty_bytes() {
        let bytes = encode_record(&oak_hill(0)).unwrap();
        assert_eq!(bytes.len(), 80);
    }

    #[test]
    fn round_trip_preserves_fields() {
        let rec = oak_hill(4);
        let bytes = encode_record(&rec).unwrap();
        assert_eq!(decode_record(&bytes).unwrap(), rec);
    }

    #[test]
    fn layout_matches_existing_files() {
        let bytes = encode_record(&oak_hill(1)).unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        // 'O' as a big-endian UTF-16 unit.
        assert_eq!(&bytes[4..6], &[0, b'O']);
        // Padding after "Oak Hill" (8 units).
        assert_eq!(&bytes[20..22], &[0, b' ']);
        assert_eq!(&bytes[34..36], &[0, b'M']);
        assert_eq!(&bytes[64..68], &2015i32.to_be_bytes());
        assert_eq!(&bytes[68..72], &12i32.to_be_bytes());
        assert_eq!(&bytes[72..80], &24.5f64.to_be_bytes());
    }

    #[test]
    fn long_estate_is_truncated_to_field_width() {
        let mut rec = oak_hill(0);
        rec.estate = "Chateau Margaux Grand Vin".to_string();
        let decoded = decode_record(&encode_record(&rec).unwrap()).unwrap();
        assert_eq!(decoded.estate, "Chateau Margaux");
        assert_eq!(encoding::utf16_len(&decoded.estate), FIELD_UNITS);
    }

    #[test]
    fn strict_encode_rejects_long_fields() {
        let mut rec = oak_hill(0);
        rec.grape = "Cabernet Sauvignon".to_string();
        let err = encode_record_strict(&rec).unwrap_err();
        assert!(matches!(
            err,
            WineError::FieldTooLong {
                field: "grape",
                units: 18,
                max: 15
            }
        ));
        assert!(encode_record_strict(&oak_hill(0)).is_ok());
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(matches!(
            decode_record(&[0u8; 79]),
            Err(WineError::Corruption {
                context: "record.len",
                ..
            })
        ));
    }

    #[test]
    fn year_bounds() {
        assert!(validate_year(1980, 2026).is_ok());
        assert!(validate_year(2026, 2026).is_ok());
        assert!(validate_year(1979, 2026).is_err());
        assert!(validate_year(2027, 2026).is_err());
    }

    #[test]
    fn draft_rejects_non_positive_quantity() {
        let err = WineDraft::new_as_of("a", "b", 2000, 0, 1.0, 2026).unwrap_err();
        assert!(matches!(
            err,
            WineError::Validation {
                field: "quantity",
                ..
            }
        ));
        assert!(WineDraft::new_as_of("a", "b", 2000, -3, 1.0, 2026).is_err());
    }

    #[test]
    fn draft_accepts_current_year() {
        let this_year = current_year();
        assert!(WineDraft::new("Oak Hill", "Merlot", this_year, 1, 10.0).is_ok());
        assert!(WineDraft::new("Oak Hill", "Merlot", this_year + 1, 1, 10.0).is_err());
    }
}
