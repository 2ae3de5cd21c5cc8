//! Settings Model
//!
//! `AppSettings` is the persisted, user-editable configuration.
//! `ReceiptSettings` is the typed projection the receipt renderer consumes.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Columns per line on 58mm paper
pub const PAPER_58MM_COLUMNS: usize = 32;
/// Columns per line on 80mm paper
pub const PAPER_80MM_COLUMNS: usize = 48;

/// Time zone used when none (or an unknown one) is configured
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;

/// Thermal paper width class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[serde(rename = "58mm")]
    Mm58,
    #[default]
    #[serde(rename = "80mm")]
    Mm80,
}

impl PaperSize {
    /// Character columns for this paper width
    pub const fn columns(self) -> usize {
        match self {
            Self::Mm58 => PAPER_58MM_COLUMNS,
            Self::Mm80 => PAPER_80MM_COLUMNS,
        }
    }
}

/// Application settings (singleton)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub restaurant_name: String,
    pub address: String,
    pub phone: String,
    pub currency: String,
    pub receipt_footer: String,
    /// Name of the most recently connected bluetooth printer
    pub bluetooth_printer: String,
    /// Print a receipt to all connected printers when an order is created
    #[serde(alias = "auto_backup")]
    pub auto_print: bool,
    pub default_staff_name: String,
    pub paper_size: PaperSize,
    pub print_copies: u8,
    pub number_of_tables: usize,
    pub order_types: Vec<String>,
    /// Prefix each receipt line item with a tick-off box
    pub enable_checkbox_receipt: bool,
    pub enable_package_menu: bool,
    pub package_categories: Vec<String>,
    /// IANA time zone name for printed timestamps
    pub timezone: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            restaurant_name: "Restoran Saya".to_string(),
            address: "Jl. Contoh No. 123, Jakarta".to_string(),
            phone: "021-12345678".to_string(),
            currency: "Rp".to_string(),
            receipt_footer: "Terima kasih atas kunjungan Anda!".to_string(),
            bluetooth_printer: String::new(),
            auto_print: true,
            default_staff_name: "Staff".to_string(),
            paper_size: PaperSize::Mm80,
            print_copies: 1,
            number_of_tables: 10,
            order_types: vec![
                "Dine In".to_string(),
                "Take Away".to_string(),
                "Delivery".to_string(),
            ],
            enable_checkbox_receipt: false,
            enable_package_menu: true,
            package_categories: vec![
                "Paket Hemat".to_string(),
                "Paket Spesial".to_string(),
                "Menu Tanpa Nasi".to_string(),
            ],
            timezone: DEFAULT_TIMEZONE.name().to_string(),
        }
    }
}

impl AppSettings {
    /// Parsed display time zone, falling back to [`DEFAULT_TIMEZONE`]
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(DEFAULT_TIMEZONE)
    }

    /// Project the fields the receipt renderer needs
    pub fn receipt_settings(&self) -> ReceiptSettings {
        ReceiptSettings {
            restaurant_name: self.restaurant_name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            paper_size: self.paper_size,
            footer: self.receipt_footer.clone(),
            checkbox: self.enable_checkbox_receipt,
            timezone: self.tz(),
        }
    }

    /// Merge a partial update into these settings
    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            restaurant_name,
            address,
            phone,
            currency,
            receipt_footer,
            bluetooth_printer,
            auto_print,
            default_staff_name,
            paper_size,
            print_copies,
            number_of_tables,
            order_types,
            enable_checkbox_receipt,
            enable_package_menu,
            package_categories,
            timezone,
        } = update;

        if let Some(v) = restaurant_name {
            self.restaurant_name = v;
        }
        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = phone {
            self.phone = v;
        }
        if let Some(v) = currency {
            self.currency = v;
        }
        if let Some(v) = receipt_footer {
            self.receipt_footer = v;
        }
        if let Some(v) = bluetooth_printer {
            self.bluetooth_printer = v;
        }
        if let Some(v) = auto_print {
            self.auto_print = v;
        }
        if let Some(v) = default_staff_name {
            self.default_staff_name = v;
        }
        if let Some(v) = paper_size {
            self.paper_size = v;
        }
        if let Some(v) = print_copies {
            self.print_copies = v;
        }
        if let Some(v) = number_of_tables {
            self.number_of_tables = v;
        }
        if let Some(v) = order_types {
            self.order_types = v;
        }
        if let Some(v) = enable_checkbox_receipt {
            self.enable_checkbox_receipt = v;
        }
        if let Some(v) = enable_package_menu {
            self.enable_package_menu = v;
        }
        if let Some(v) = package_categories {
            self.package_categories = v;
        }
        if let Some(v) = timezone {
            self.timezone = v;
        }
    }
}

/// Update settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub currency: Option<String>,
    pub receipt_footer: Option<String>,
    pub bluetooth_printer: Option<String>,
    pub auto_print: Option<bool>,
    pub default_staff_name: Option<String>,
    pub paper_size: Option<PaperSize>,
    pub print_copies: Option<u8>,
    pub number_of_tables: Option<usize>,
    pub order_types: Option<Vec<String>>,
    pub enable_checkbox_receipt: Option<bool>,
    pub enable_package_menu: Option<bool>,
    pub package_categories: Option<Vec<String>>,
    pub timezone: Option<String>,
}

/// Receipt layout inputs
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSettings {
    pub restaurant_name: String,
    pub address: String,
    pub phone: String,
    pub paper_size: PaperSize,
    pub footer: String,
    pub checkbox: bool,
    pub timezone: Tz,
}

impl ReceiptSettings {
    /// Line width in characters
    pub fn width(&self) -> usize {
        self.paper_size.columns()
    }
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        AppSettings::default().receipt_settings()
    }
}
