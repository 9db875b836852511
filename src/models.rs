use std::fmt;

use chrono::{DateTime, Local};

/// A known column of the transaction export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    DocumentId,
    Establishment,
    PayerName,
    PayerEmail,
    TransactionCode,
    TransactionDate,
    SettlementDate,
    Brand,
    PaymentMethod,
    Installment,
    GrossValue,
    FeeValue,
    NetValue,
    Status,
    CardNumber,
    AuthorizationCode,
    Nsu,
    DeviceId,
    SaleCode,
    ReferenceCode,
    PurchaserName,
    PurchaserEmail,
    PixTransactionId,
    SplitId,
}

pub const FIELD_COUNT: usize = 24;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::DocumentId,
        Field::Establishment,
        Field::PayerName,
        Field::PayerEmail,
        Field::TransactionCode,
        Field::TransactionDate,
        Field::SettlementDate,
        Field::Brand,
        Field::PaymentMethod,
        Field::Installment,
        Field::GrossValue,
        Field::FeeValue,
        Field::NetValue,
        Field::Status,
        Field::CardNumber,
        Field::AuthorizationCode,
        Field::Nsu,
        Field::DeviceId,
        Field::SaleCode,
        Field::ReferenceCode,
        Field::PurchaserName,
        Field::PurchaserEmail,
        Field::PixTransactionId,
        Field::SplitId,
    ];

    /// Exact column name as it appears in the export header.
    pub fn header(&self) -> &'static str {
        match self {
            Self::DocumentId => "Documento",
            Self::Establishment => "Estabelecimento",
            Self::PayerName => "Nome Pagador",
            Self::PayerEmail => "E-mail Pagador",
            Self::TransactionCode => "Código da Transação",
            Self::TransactionDate => "Data da Transação",
            Self::SettlementDate => "Data de Compensação",
            Self::Brand => "Bandeira",
            Self::PaymentMethod => "Meio de Pagamento",
            Self::Installment => "Parcela",
            Self::GrossValue => "Valor Bruto",
            Self::FeeValue => "Valor Taxa",
            Self::NetValue => "Valor Líquido",
            Self::Status => "Status",
            Self::CardNumber => "Número do Cartão",
            Self::AuthorizationCode => "Código de Autorização",
            Self::Nsu => "NSU",
            Self::DeviceId => "Serial Leitor",
            Self::SaleCode => "Código de Venda",
            Self::ReferenceCode => "Código de Referência",
            Self::PurchaserName => "Nome Comprador",
            Self::PurchaserEmail => "E-mail Comprador",
            Self::PixTransactionId => "ID Transação PIX",
            Self::SplitId => "ID Split",
        }
    }

    pub fn from_header(raw: &str) -> Option<Field> {
        let name = raw.trim_start_matches('\u{feff}').trim();
        Self::ALL.iter().find(|f| f.header() == name).copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One parsed transaction row. Fields not present in the export read as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; FIELD_COUNT],
}

impl Record {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, S)>,
        S: Into<String>,
    {
        let mut record = Self::default();
        for (field, value) in pairs {
            record.values[field.index()] = value.into();
        }
        record
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }
}

/// An immutable snapshot of the export as of `captured_at`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Recognised columns in header order.
    pub columns: Vec<Field>,
    pub captured_at: DateTime<Local>,
    /// SHA-256 of the raw payload.
    pub checksum: String,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
