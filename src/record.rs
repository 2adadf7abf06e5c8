use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Product sold in a [`SalesRecord`]
///
/// Each product belongs to exactly one [`Category`], see [`Product::category`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "Laptop Pro")]
    LaptopPro,
    #[serde(rename = "Desktop Elite")]
    DesktopElite,
    #[serde(rename = "Monitor 4K")]
    Monitor4K,
    #[serde(rename = "Wireless Mouse")]
    WirelessMouse,
    #[serde(rename = "Mechanical Keyboard")]
    MechanicalKeyboard,
    #[serde(rename = "Tablet Air")]
    TabletAir,
    #[serde(rename = "Smartphone X")]
    SmartphoneX,
    #[serde(rename = "Headphones Premium")]
    HeadphonesPremium,
    #[serde(rename = "Webcam HD")]
    WebcamHd,
    #[serde(rename = "Speaker Set")]
    SpeakerSet,
    #[serde(rename = "Router WiFi 6")]
    RouterWifi6,
    #[serde(rename = "External SSD")]
    ExternalSsd,
    #[serde(rename = "USB Hub")]
    UsbHub,
    #[serde(rename = "Cable HDMI")]
    CableHdmi,
    #[serde(rename = "Power Bank")]
    PowerBank,
    #[serde(rename = "Smart Watch")]
    SmartWatch,
    #[serde(rename = "Fitness Tracker")]
    FitnessTracker,
    #[serde(rename = "Gaming Chair")]
    GamingChair,
    #[serde(rename = "Desk Lamp LED")]
    DeskLampLed,
    #[serde(rename = "Document Scanner")]
    DocumentScanner,
}

impl Product {
    pub const ALL: [Product; 20] = [
        Product::LaptopPro,
        Product::DesktopElite,
        Product::Monitor4K,
        Product::WirelessMouse,
        Product::MechanicalKeyboard,
        Product::TabletAir,
        Product::SmartphoneX,
        Product::HeadphonesPremium,
        Product::WebcamHd,
        Product::SpeakerSet,
        Product::RouterWifi6,
        Product::ExternalSsd,
        Product::UsbHub,
        Product::CableHdmi,
        Product::PowerBank,
        Product::SmartWatch,
        Product::FitnessTracker,
        Product::GamingChair,
        Product::DeskLampLed,
        Product::DocumentScanner,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Product::LaptopPro => "Laptop Pro",
            Product::DesktopElite => "Desktop Elite",
            Product::Monitor4K => "Monitor 4K",
            Product::WirelessMouse => "Wireless Mouse",
            Product::MechanicalKeyboard => "Mechanical Keyboard",
            Product::TabletAir => "Tablet Air",
            Product::SmartphoneX => "Smartphone X",
            Product::HeadphonesPremium => "Headphones Premium",
            Product::WebcamHd => "Webcam HD",
            Product::SpeakerSet => "Speaker Set",
            Product::RouterWifi6 => "Router WiFi 6",
            Product::ExternalSsd => "External SSD",
            Product::UsbHub => "USB Hub",
            Product::CableHdmi => "Cable HDMI",
            Product::PowerBank => "Power Bank",
            Product::SmartWatch => "Smart Watch",
            Product::FitnessTracker => "Fitness Tracker",
            Product::GamingChair => "Gaming Chair",
            Product::DeskLampLed => "Desk Lamp LED",
            Product::DocumentScanner => "Document Scanner",
        }
    }

    /// The one category this product is sold under.
    pub fn category(self) -> Category {
        match self {
            Product::LaptopPro | Product::DesktopElite => Category::Computers,
            Product::Monitor4K | Product::WirelessMouse | Product::MechanicalKeyboard => {
                Category::Peripherals
            }
            Product::TabletAir | Product::SmartphoneX => Category::MobileDevices,
            Product::HeadphonesPremium | Product::WebcamHd | Product::SpeakerSet => {
                Category::AudioVideo
            }
            Product::RouterWifi6 => Category::Networking,
            Product::ExternalSsd => Category::Storage,
            Product::UsbHub | Product::CableHdmi | Product::PowerBank => Category::Accessories,
            Product::SmartWatch | Product::FitnessTracker => Category::Wearables,
            Product::GamingChair | Product::DeskLampLed => Category::Furniture,
            Product::DocumentScanner => Category::OfficeEquipment,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Computers,
    Peripherals,
    #[serde(rename = "Mobile Devices")]
    MobileDevices,
    #[serde(rename = "Audio/Video")]
    AudioVideo,
    Networking,
    Storage,
    Accessories,
    Wearables,
    Furniture,
    #[serde(rename = "Office Equipment")]
    OfficeEquipment,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Computers,
        Category::Peripherals,
        Category::MobileDevices,
        Category::AudioVideo,
        Category::Networking,
        Category::Storage,
        Category::Accessories,
        Category::Wearables,
        Category::Furniture,
        Category::OfficeEquipment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Computers => "Computers",
            Category::Peripherals => "Peripherals",
            Category::MobileDevices => "Mobile Devices",
            Category::AudioVideo => "Audio/Video",
            Category::Networking => "Networking",
            Category::Storage => "Storage",
            Category::Accessories => "Accessories",
            Category::Wearables => "Wearables",
            Category::Furniture => "Furniture",
            Category::OfficeEquipment => "Office Equipment",
        }
    }

    /// Unit price band in cents, both ends inclusive.
    pub fn price_band(self) -> RangeInclusive<i64> {
        match self {
            Category::Computers => 50_000..=200_000,
            Category::MobileDevices => 20_000..=120_000,
            Category::AudioVideo => 5_000..=50_000,
            Category::Networking => 10_000..=40_000,
            Category::Storage => 8_000..=30_000,
            Category::Wearables => 10_000..=60_000,
            Category::Furniture => 20_000..=80_000,
            Category::Peripherals | Category::Accessories | Category::OfficeEquipment => {
                2_000..=20_000
            }
        }
    }

    /// Profit margin band in tenths of a percent, both ends inclusive.
    pub fn margin_band(self) -> RangeInclusive<u16> {
        match self {
            Category::Computers | Category::MobileDevices => 150..=350,
            Category::AudioVideo | Category::Wearables => 250..=450,
            _ => 300..=600,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::South,
        Region::East,
        Region::West,
        Region::Central,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SalesRep {
    #[serde(rename = "Alice Johnson")]
    AliceJohnson,
    #[serde(rename = "Bob Smith")]
    BobSmith,
    #[serde(rename = "Carol Davis")]
    CarolDavis,
    #[serde(rename = "David Wilson")]
    DavidWilson,
    #[serde(rename = "Emma Brown")]
    EmmaBrown,
    #[serde(rename = "Frank Miller")]
    FrankMiller,
    #[serde(rename = "Grace Lee")]
    GraceLee,
    #[serde(rename = "Henry Taylor")]
    HenryTaylor,
    #[serde(rename = "Iris Chen")]
    IrisChen,
    #[serde(rename = "Jack Anderson")]
    JackAnderson,
}

impl SalesRep {
    pub const ALL: [SalesRep; 10] = [
        SalesRep::AliceJohnson,
        SalesRep::BobSmith,
        SalesRep::CarolDavis,
        SalesRep::DavidWilson,
        SalesRep::EmmaBrown,
        SalesRep::FrankMiller,
        SalesRep::GraceLee,
        SalesRep::HenryTaylor,
        SalesRep::IrisChen,
        SalesRep::JackAnderson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SalesRep::AliceJohnson => "Alice Johnson",
            SalesRep::BobSmith => "Bob Smith",
            SalesRep::CarolDavis => "Carol Davis",
            SalesRep::DavidWilson => "David Wilson",
            SalesRep::EmmaBrown => "Emma Brown",
            SalesRep::FrankMiller => "Frank Miller",
            SalesRep::GraceLee => "Grace Lee",
            SalesRep::HenryTaylor => "Henry Taylor",
            SalesRep::IrisChen => "Iris Chen",
            SalesRep::JackAnderson => "Jack Anderson",
        }
    }
}

impl fmt::Display for SalesRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Money with two decimal places, stored as whole cents
///
/// Arithmetic stays in integers so `quantity * unit_price` never drifts.
/// Serializes as a JSON number (`12.5` for 1250 cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn times(self, quantity: u32) -> Self {
        Amount(self.0 * i64::from(quantity))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Rounds to the nearest cent.
    pub fn from_f64(value: f64) -> Self {
        Amount((value * 100.0).round() as i64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Amount::from_f64)
    }
}

/// Percentage with one decimal place, stored in tenths of a percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Percent(u16);

impl Percent {
    pub fn from_tenths(tenths: u16) -> Self {
        Percent(tenths)
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !(0.0..=100.0).contains(&value) {
            return Err(serde::de::Error::custom(format!(
                "percentage {} is outside 0..=100",
                value
            )));
        }
        Ok(Percent((value * 10.0).round() as u16))
    }
}

/// One row of the synthetic sales dataset.
///
/// Fields are read through accessors so `category` and `total_amount` can only come from
/// [`SalesRecord::new`]. Deserialization goes through the same constructor and rejects
/// rows whose derived columns disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSalesRecord")]
pub struct SalesRecord {
    date: NaiveDate,
    product: Product,
    category: Category,
    region: Region,
    sales_rep: SalesRep,
    quantity: u32,
    unit_price: Amount,
    total_amount: Amount,
    profit_margin: Percent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSalesRecord {
    date: NaiveDate,
    product: Product,
    category: Category,
    region: Region,
    sales_rep: SalesRep,
    quantity: u32,
    unit_price: Amount,
    total_amount: Amount,
    profit_margin: Percent,
}

impl TryFrom<RawSalesRecord> for SalesRecord {
    type Error = String;

    fn try_from(raw: RawSalesRecord) -> Result<Self, Self::Error> {
        let record = SalesRecord::new(
            raw.date,
            raw.product,
            raw.region,
            raw.sales_rep,
            raw.quantity,
            raw.unit_price,
            raw.profit_margin,
        );
        if raw.category != record.category {
            return Err(format!(
                "{} belongs to {}, not {}",
                record.product, record.category, raw.category
            ));
        }
        if raw.total_amount != record.total_amount {
            return Err(format!(
                "total {} does not equal {} x {}",
                raw.total_amount, record.quantity, record.unit_price
            ));
        }
        Ok(record)
    }
}

impl SalesRecord {
    /// Builds a record, deriving `category` and `total_amount` so neither can disagree
    /// with the product, quantity and unit price.
    pub fn new(
        date: NaiveDate,
        product: Product,
        region: Region,
        sales_rep: SalesRep,
        quantity: u32,
        unit_price: Amount,
        profit_margin: Percent,
    ) -> Self {
        SalesRecord {
            date,
            product,
            category: product.category(),
            region,
            sales_rep,
            quantity,
            unit_price,
            total_amount: unit_price.times(quantity),
            profit_margin,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn sales_rep(&self) -> SalesRep {
        self.sales_rep
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    pub fn profit_margin(&self) -> Percent {
        self.profit_margin
    }

    /// True when the derived columns agree with the sampled ones.
    pub fn is_consistent(&self) -> bool {
        self.category == self.product.category()
            && self.total_amount == self.unit_price.times(self.quantity)
    }
}
