use serde::Serialize;

/// Versioned target schema: the field paths a sample must cover and the
/// currencies invoices may be issued in.
///
/// Paths are dot-separated. A `[]` suffix on a segment marks a field that is
/// repeated once per line item (`lines[].qty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaDefinition {
    pub version: &'static str,
    pub required: &'static [&'static str],
    pub allowed_currencies: &'static [&'static str],
}

pub const GETS_V0_1: SchemaDefinition = SchemaDefinition {
    version: "GETS v0.1",
    required: &[
        "invoice.id",
        "invoice.issue_date",
        "invoice.currency",
        "invoice.total_excl_vat",
        "invoice.vat_amount",
        "invoice.total_incl_vat",
        "seller.name",
        "seller.trn",
        "seller.country",
        "buyer.name",
        "buyer.trn",
        "buyer.country",
        "lines[].sku",
        "lines[].qty",
        "lines[].unit_price",
        "lines[].line_total",
    ],
    allowed_currencies: &["AED", "SAR", "MYR", "USD"],
};

impl SchemaDefinition {
    pub fn gets_v0_1() -> Self {
        GETS_V0_1
    }

    pub fn required_count(&self) -> usize {
        self.required.len()
    }

    /// `code` must already be upper-cased.
    pub fn allows_currency(&self, code: &str) -> bool {
        self.allowed_currencies.contains(&code)
    }
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        GETS_V0_1
    }
}
