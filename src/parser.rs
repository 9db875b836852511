use sha2::{Digest, Sha256};

use crate::error::ParseError;
use crate::models::{Field, Record};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with rows whose cell count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Drop extra cells, default missing cells to "".
    #[default]
    Lenient,
    /// Skip the row and count it.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub delimiter: u8,
    pub row_policy: RowPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            row_policy: RowPolicy::Lenient,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedPayload {
    pub records: Vec<Record>,
    pub columns: Vec<Field>,
    pub skipped_rows: usize,
}

pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// parse_payload
// ---------------------------------------------------------------------------

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|cell| cell.trim().is_empty())
}

pub fn parse_payload(data: &[u8], options: &ParseOptions) -> Result<ParsedPayload, ParseError> {
    let text = std::str::from_utf8(data).map_err(|e| ParseError::Encoding(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();

    // First non-blank line is the header
    let header = loop {
        match records.next() {
            None => return Err(ParseError::MissingHeader),
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(record)) if is_blank(&record) => continue,
            Some(Ok(record)) => break record,
        }
    };

    let slots: Vec<Option<Field>> = header
        .iter()
        .map(|name| {
            let field = Field::from_header(name);
            if field.is_none() {
                log::debug!("ignoring unknown column {name:?}");
            }
            field
        })
        .collect();
    let columns: Vec<Field> = slots.iter().flatten().copied().collect();

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping unreadable row: {e}");
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }
        if record.len() != slots.len() && options.row_policy == RowPolicy::Strict {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            log::warn!(
                "skipping line {line}: expected {} cells, found {}",
                slots.len(),
                record.len()
            );
            skipped_rows += 1;
            continue;
        }
        let pairs = slots
            .iter()
            .zip(record.iter())
            .filter_map(|(slot, cell)| slot.map(|field| (field, cell)));
        rows.push(Record::from_pairs(pairs));
    }

    Ok(ParsedPayload {
        records: rows,
        columns,
        skipped_rows,
    })
}

// ---------------------------------------------------------------------------
// write_payload
// ---------------------------------------------------------------------------

/// Serialize records under the same header/delimiter contract `parse_payload` reads.
pub fn write_payload(
    columns: &[Field],
    records: &[Record],
    delimiter: u8,
) -> Result<String, ParseError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(columns.iter().map(|f| f.header()))?;
    for record in records {
        wtr.write_record(columns.iter().map(|f| record.get(*f)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ParseError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ParseError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedPayload {
        parse_payload(text.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let parsed = parse("Nome Comprador;E-mail Comprador\nAna;ana@x.com\nBia;bia@x.com\n");
        assert_eq!(parsed.columns, vec![Field::PurchaserName, Field::PurchaserEmail]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].get(Field::PurchaserName), "Ana");
        assert_eq!(parsed.records[1].get(Field::PurchaserEmail), "bia@x.com");
        assert_eq!(parsed.skipped_rows, 0);
    }

    #[test]
    fn test_parse_short_row_defaults_to_empty() {
        let parsed = parse("Código de Referência;Nome Comprador;E-mail Comprador\nREF1;Ana\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get(Field::ReferenceCode), "REF1");
        assert_eq!(parsed.records[0].get(Field::PurchaserName), "Ana");
        assert_eq!(parsed.records[0].get(Field::PurchaserEmail), "");
    }

    #[test]
    fn test_parse_extra_cells_dropped() {
        let parsed = parse("Nome Comprador;E-mail Comprador\nAna;ana@x.com;surplus;more\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get(Field::PurchaserEmail), "ana@x.com");
    }

    #[test]
    fn test_parse_strict_skips_mismatched_rows() {
        let options = ParseOptions {
            row_policy: RowPolicy::Strict,
            ..ParseOptions::default()
        };
        let text = "Nome Comprador;E-mail Comprador\nAna;ana@x.com\nBia\nCai;cai@x.com;x\n";
        let parsed = parse_payload(text.as_bytes(), &options).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped_rows, 2);
    }

    #[test]
    fn test_parse_skips_empty_lines_and_crlf() {
        let parsed = parse("\r\nNome Comprador;E-mail Comprador\r\n\r\nAna;ana@x.com\r\n\r\nBia;bia@x.com\r\n");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].get(Field::PurchaserEmail), "ana@x.com");
        assert_eq!(parsed.records[1].get(Field::PurchaserName), "Bia");
    }

    #[test]
    fn test_parse_header_only_is_empty_dataset() {
        let parsed = parse("Nome Comprador;E-mail Comprador\n");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.columns.len(), 2);
    }

    #[test]
    fn test_parse_empty_payload_is_error() {
        let err = parse_payload(b"", &ParseOptions::default()).unwrap_err();
        assert_eq!(err, ParseError::MissingHeader);
        let err = parse_payload(b"\n\n", &ParseOptions::default()).unwrap_err();
        assert_eq!(err, ParseError::MissingHeader);
    }

    #[test]
    fn test_parse_invalid_utf8_is_error() {
        let data = b"Nome Comprador;E-mail Comprador\n\xff\xfe;x\n";
        let err = parse_payload(data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_parse_strips_bom_and_ignores_unknown_columns() {
        let parsed = parse("\u{feff}Nome Comprador;Observações;E-mail Comprador\nAna;nota;ana@x.com\n");
        assert_eq!(parsed.columns, vec![Field::PurchaserName, Field::PurchaserEmail]);
        assert_eq!(parsed.records[0].get(Field::PurchaserName), "Ana");
        assert_eq!(parsed.records[0].get(Field::PurchaserEmail), "ana@x.com");
    }

    #[test]
    fn test_parse_keeps_raw_values() {
        let parsed = parse("Valor Bruto;Nome Comprador\n\"1.234,56\"; Ana \n");
        assert_eq!(parsed.records[0].get(Field::GrossValue), "1.234,56");
        assert_eq!(parsed.records[0].get(Field::PurchaserName), " Ana ");
    }

    #[test]
    fn test_custom_delimiter() {
        let options = ParseOptions {
            delimiter: b',',
            ..ParseOptions::default()
        };
        let parsed = parse_payload(b"Nome Comprador,E-mail Comprador\nAna,ana@x.com\n", &options).unwrap();
        assert_eq!(parsed.records[0].get(Field::PurchaserEmail), "ana@x.com");
    }

    #[test]
    fn test_write_then_parse_preserves_records() {
        let records = vec![
            Record::from_pairs(
                Field::ALL.iter().map(|f| (*f, format!("{} one", f.header()))),
            ),
            Record::from_pairs([
                (Field::ReferenceCode, "REF-2"),
                (Field::PurchaserName, "Bia"),
                (Field::PurchaserEmail, "bia@x.com"),
            ]),
            Record::default(),
        ];
        let text = write_payload(&Field::ALL, &records, b';').unwrap();
        let parsed = parse(&text);
        assert_eq!(parsed.columns, Field::ALL.to_vec());
        assert_eq!(parsed.records, records);
    }

    #[test]
    fn test_write_quotes_delimiter() {
        let records = vec![Record::from_pairs([(Field::PurchaserName, "Silva; Ana")])];
        let text = write_payload(&[Field::PurchaserName], &records, b';').unwrap();
        assert_eq!(text, "Nome Comprador\n\"Silva; Ana\"\n");
        assert_eq!(parse(&text).records, records);
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(compute_checksum(b"abc"), compute_checksum(b"abc"));
        assert_ne!(compute_checksum(b"abc"), compute_checksum(b"abd"));
        assert_eq!(compute_checksum(b"").len(), 64);
    }
}
