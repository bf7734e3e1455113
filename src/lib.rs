// lib.rs - MediLink shared application core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::App as CruxApp;

// --- Timings (milliseconds) for the shell-driven delays ---

pub const SPLASH_DELAY_MS: u64 = 3_000;
pub const REQUEST_SEND_DELAY_MS: u64 = 2_000;
pub const REQUEST_REDIRECT_DELAY_MS: u64 = 2_000;
pub const SCAN_DELAY_MS: u64 = 3_000;
pub const GALLERY_PROCESS_DELAY_MS: u64 = 1_000;
pub const VOICE_SEARCH_DELAY_MS: u64 = 2_000;
pub const RECORD_DOWNLOAD_DELAY_MS: u64 = 1_500;

// --- Domain bounds and fixed inputs ---

pub const MIN_UNITS: u8 = 1;
pub const MAX_UNITS: u8 = 10;
pub const DEFAULT_UNITS: u8 = 2;

/// A medicine search only fires once the query is longer than this.
pub const SEARCH_MIN_QUERY_CHARS: usize = 2;
pub const VOICE_SEARCH_QUERY: &str = "Paracetamol";

pub const SWIPE_BACK_MIN_DX: f64 = 100.0;
pub const SWIPE_BACK_MAX_DY: f64 = 100.0;

pub const WORKER_SCRIPT_URL: &str = "/sw.js";
pub const EMERGENCY_NUMBER: &str = "911";

// --- Validation ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("blood units {0} out of range [{MIN_UNITS}, {MAX_UNITS}]")]
    UnitsOutOfRange(u8),
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(DonorId);
typed_id!(RecordId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderId(pub u32);

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToastId(Uuid);

impl ToastId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Screens ---

/// A full-page view. Exactly one screen is current at any time; the enum
/// carries that invariant instead of a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    #[serde(rename = "splash-screen")]
    Splash,
    #[serde(rename = "auth-screen")]
    Auth,
    #[serde(rename = "home-screen")]
    Home,
    #[serde(rename = "blood-request")]
    BloodRequest,
    #[serde(rename = "scan-prescription")]
    ScanPrescription,
    #[serde(rename = "search-medicine")]
    SearchMedicine,
    #[serde(rename = "reminders")]
    Reminders,
    #[serde(rename = "medical-records")]
    MedicalRecords,
    #[serde(rename = "donor-map")]
    DonorMap,
    #[serde(rename = "profile")]
    Profile,
    #[serde(rename = "lore-screen")]
    Lore,
}

impl Screen {
    pub const ALL: [Self; 11] = [
        Self::Splash,
        Self::Auth,
        Self::Home,
        Self::BloodRequest,
        Self::ScanPrescription,
        Self::SearchMedicine,
        Self::Reminders,
        Self::MedicalRecords,
        Self::DonorMap,
        Self::Profile,
        Self::Lore,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Splash => "splash-screen",
            Self::Auth => "auth-screen",
            Self::Home => "home-screen",
            Self::BloodRequest => "blood-request",
            Self::ScanPrescription => "scan-prescription",
            Self::SearchMedicine => "search-medicine",
            Self::Reminders => "reminders",
            Self::MedicalRecords => "medical-records",
            Self::DonorMap => "donor-map",
            Self::Profile => "profile",
            Self::Lore => "lore-screen",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.as_str() == s)
    }

    /// Bottom-navigation slot for the screens reachable from the tab bar.
    #[must_use]
    pub const fn nav_index(self) -> Option<u8> {
        match self {
            Self::Home => Some(0),
            Self::DonorMap => Some(1),
            Self::BloodRequest => Some(2),
            Self::MedicalRecords => Some(3),
            Self::Profile => Some(4),
            _ => None,
        }
    }

    /// Static back-route table. There is no history stack, so chained
    /// navigation cannot return through more than one hop.
    #[must_use]
    pub const fn back_target(self) -> Self {
        match self {
            Self::BloodRequest
            | Self::ScanPrescription
            | Self::SearchMedicine
            | Self::Reminders
            | Self::MedicalRecords
            | Self::DonorMap
            | Self::Profile
            | Self::Lore => Self::Home,
            // Entry screens have no mapped route and fall back to home.
            Self::Splash | Self::Auth | Self::Home => Self::Home,
        }
    }

    /// Swipe-back is suppressed on the entry screens.
    #[must_use]
    pub const fn swipe_back_enabled(self) -> bool {
        !matches!(self, Self::Home | Self::Splash | Self::Auth)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Domain enums replacing stringly-typed fields ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

impl AuthTab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    OPositive,
    ONegative,
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
}

impl BloodType {
    pub const ALL: [Self; 8] = [
        Self::OPositive,
        Self::ONegative,
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OPositive => "O+",
            Self::ONegative => "O-",
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|blood_type| blood_type.as_str() == s)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Critical,
    Urgent,
    Standard,
}

impl Urgency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Urgent => "urgent",
            Self::Standard => "standard",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Self::Critical),
            "urgent" => Some(Self::Urgent),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
}

impl Availability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
        }
    }

    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockLevel {
    InStock,
    LowStock,
}

impl StockLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::LowStock => "low-stock",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "in stock",
            Self::LowStock => "low stock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordFilter {
    #[default]
    All,
    Prescriptions,
    Tests,
    Visits,
}

impl RecordFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Prescriptions => "prescriptions",
            Self::Tests => "tests",
            Self::Visits => "visits",
        }
    }

    const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::All => &[],
            Self::Prescriptions => &["prescription"],
            Self::Tests => &["test"],
            Self::Visits => &["visits", "exam"],
        }
    }

    /// Visibility check against a record title, case-insensitive.
    #[must_use]
    pub fn matches(self, title: &str) -> bool {
        if matches!(self, Self::All) {
            return true;
        }
        let title = title.to_lowercase();
        self.keywords().iter().any(|keyword| title.contains(keyword))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileAction {
    EditProfile,
    EditPersonalInfo,
    EmergencyContacts,
    DonorSettings,
    PrivacySettings,
    Notifications,
}

impl ProfileAction {
    /// These rows are stubs in the demo; each one only confirms itself.
    #[must_use]
    pub const fn placeholder_message(self) -> &'static str {
        match self {
            Self::EditProfile => "Edit profile feature coming soon!",
            Self::EditPersonalInfo => "Edit personal information feature coming soon!",
            Self::EmergencyContacts => "Emergency contacts management coming soon!",
            Self::DonorSettings => "Donor settings feature coming soon!",
            Self::PrivacySettings => "Privacy & security settings coming soon!",
            Self::Notifications => "Notification settings feature coming soon!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderIcon {
    Pills,
    Syringe,
    CalendarCheck,
}

impl ReminderIcon {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Pills => "fas fa-pills",
            Self::Syringe => "fas fa-syringe",
            Self::CalendarCheck => "fas fa-calendar-check",
        }
    }
}

// --- Validated unit count ---

/// Requested blood units, always within [`MIN_UNITS`, `MAX_UNITS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Units(u8);

impl Units {
    pub fn new(count: u8) -> Result<Self, ValidationError> {
        if (MIN_UNITS..=MAX_UNITS).contains(&count) {
            Ok(Self(count))
        } else {
            Err(ValidationError::UnitsOutOfRange(count))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Applies a signed step, clamping to the allowed range.
    #[must_use]
    pub fn stepped(self, delta: i8) -> Self {
        let next = i16::from(self.0).saturating_add(i16::from(delta));
        let clamped = next.clamp(i16::from(MIN_UNITS), i16::from(MAX_UNITS));
        Self(u8::try_from(clamped).unwrap_or(MAX_UNITS))
    }
}

impl Default for Units {
    fn default() -> Self {
        Self(DEFAULT_UNITS)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Data model ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub blood_type: BloodType,
    pub phone: String,
    pub donations: u32,
    pub rating: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequestDraft {
    pub blood_type: BloodType,
    pub units: Units,
    pub urgency: Urgency,
    pub hospital: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub name: String,
    pub frequency: String,
    pub next_dose: String,
    pub active: bool,
    pub icon: ReminderIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub blood_type: BloodType,
    pub distance_m: u32,
    pub availability: Availability,
    pub rating: f32,
    pub last_donation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub description: String,
    pub price_cents: u32,
    pub stock: StockLevel,
}

impl Medicine {
    /// Substring match on name or description; expects a lowercased query.
    fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: RecordId,
    pub title: String,
    pub detail: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentScan {
    pub name: String,
    pub scanned: String,
}

// --- Toasts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn display_duration_ms(self) -> u64 {
        match self {
            Self::Success => 3_000,
            Self::Error => 4_000,
        }
    }
}

/// Transient notification. Toasts stack; each one carries its own expiry
/// timer and is removed when that timer fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            id: ToastId::generate(),
            message: message.into(),
            kind,
        }
    }
}

// --- Modals ---

/// At most one modal is visible at a time; opening a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    Emergency,
    DonorProfile(DonorId),
    ConfirmLogout,
}

// --- Display formatting ---

/// Formats a donor distance for display ("850 m", "2.3 km", "15 km").
#[must_use]
pub fn format_distance(meters: u32) -> String {
    if meters < 1_000 {
        format!("{meters} m")
    } else if meters < 10_000 {
        format!("{}.{} km", meters / 1_000, (meters % 1_000) / 100)
    } else {
        format!("{} km", meters / 1_000)
    }
}

/// Formats a price in cents as "$8.99".
#[must_use]
pub fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Percentage of reminders still active, rounded; 0 for an empty list.
#[must_use]
pub fn adherence_rate(reminders: &[Reminder]) -> u8 {
    if reminders.is_empty() {
        return 0;
    }
    let active = reminders.iter().filter(|r| r.active).count();
    let pct = (active * 100 + reminders.len() / 2) / reminders.len();
    u8::try_from(pct).unwrap_or(100)
}

// --- Mock data ---

fn seed_user() -> UserProfile {
    UserProfile {
        name: "John Doe".into(),
        email: "john.doe@email.com".into(),
        blood_type: BloodType::OPositive,
        phone: "+1 234-567-8900".into(),
        donations: 5,
        rating: 4.9,
    }
}

fn seed_reminders() -> Vec<Reminder> {
    vec![
        Reminder {
            id: ReminderId(1),
            name: "Blood Pressure Medication".into(),
            frequency: "Every day at 9:00 AM".into(),
            next_dose: "Today 9:00 AM".into(),
            active: true,
            icon: ReminderIcon::Pills,
        },
        Reminder {
            id: ReminderId(2),
            name: "Insulin Injection".into(),
            frequency: "Before meals".into(),
            next_dose: "Today 12:30 PM".into(),
            active: true,
            icon: ReminderIcon::Syringe,
        },
        Reminder {
            id: ReminderId(3),
            name: "Doctor Appointment".into(),
            frequency: "Dr. Smith - Cardiology".into(),
            next_dose: "Tomorrow 2:00 PM".into(),
            active: true,
            icon: ReminderIcon::CalendarCheck,
        },
    ]
}

fn seed_donors() -> Vec<Donor> {
    vec![
        Donor {
            id: DonorId::new("donor1"),
            name: "Sarah Johnson".into(),
            blood_type: BloodType::OPositive,
            distance_m: 2_300,
            availability: Availability::Available,
            rating: 4.9,
            last_donation: "2 weeks ago".into(),
        },
        Donor {
            id: DonorId::new("donor2"),
            name: "Michael Chen".into(),
            blood_type: BloodType::APositive,
            distance_m: 3_700,
            availability: Availability::Busy,
            rating: 4.7,
            last_donation: "1 month ago".into(),
        },
        Donor {
            id: DonorId::new("donor3"),
            name: "Emma Rodriguez".into(),
            blood_type: BloodType::BNegative,
            distance_m: 1_800,
            availability: Availability::Available,
            rating: 4.8,
            last_donation: "3 weeks ago".into(),
        },
    ]
}

fn seed_records() -> Vec<MedicalRecord> {
    vec![
        MedicalRecord {
            id: RecordId::new("blood-test-results"),
            title: "Blood Test Results".into(),
            detail: "Complete blood count - Dr. Patel".into(),
            date: "Mar 12, 2026".into(),
        },
        MedicalRecord {
            id: RecordId::new("prescription-lisinopril"),
            title: "Prescription - Lisinopril 10mg".into(),
            detail: "Refill until Dec 2026 - Dr. Smith".into(),
            date: "Feb 28, 2026".into(),
        },
        MedicalRecord {
            id: RecordId::new("annual-physical-exam"),
            title: "Annual Physical Exam".into(),
            detail: "Routine checkup - Dr. Smith".into(),
            date: "Jan 15, 2026".into(),
        },
        MedicalRecord {
            id: RecordId::new("allergy-test-panel"),
            title: "Allergy Test Panel".into(),
            detail: "Environmental panel - Dr. Osei".into(),
            date: "Dec 02, 2025".into(),
        },
    ]
}

fn seed_recent_scans() -> Vec<RecentScan> {
    vec![
        RecentScan {
            name: "Blood Pressure Medication".into(),
            scanned: "2 days ago".into(),
        },
        RecentScan {
            name: "Cholesterol Tablets".into(),
            scanned: "1 week ago".into(),
        },
    ]
}

/// The searchable catalog. It belongs to the search itself, not to any
/// shared state.
fn medicine_catalog() -> Vec<Medicine> {
    vec![
        Medicine {
            name: "Paracetamol 500mg".into(),
            description: "Pain relief, fever reducer".into(),
            price_cents: 899,
            stock: StockLevel::InStock,
        },
        Medicine {
            name: "Aspirin 100mg".into(),
            description: "Blood thinner, heart health".into(),
            price_cents: 1_250,
            stock: StockLevel::LowStock,
        },
        Medicine {
            name: "Ibuprofen 400mg".into(),
            description: "Anti-inflammatory, pain relief".into(),
            price_cents: 1_025,
            stock: StockLevel::InStock,
        },
    ]
}

fn search_medicines(query: &str) -> Vec<Medicine> {
    let query = query.to_lowercase();
    medicine_catalog()
        .into_iter()
        .filter(|medicine| medicine.matches(&query))
        .collect()
}

// --- Model ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub screen: Screen,
    pub auth_tab: AuthTab,
    pub user: UserProfile,

    // Blood request
    pub blood_request: BloodRequestDraft,
    pub request_in_flight: bool,

    // Mock data stores
    pub reminders: Vec<Reminder>,
    pub donors: Vec<Donor>,
    pub records: Vec<MedicalRecord>,
    pub recent_scans: Vec<RecentScan>,

    // Per-screen UI state
    pub record_filter: RecordFilter,
    pub scan_in_progress: bool,
    pub flash_on: bool,
    pub medicine_query: String,
    pub medicine_results: Vec<Medicine>,
    pub voice_search_active: bool,

    // Overlays
    pub modal: Option<Modal>,
    pub toasts: Vec<Toast>,

    pub network_online: bool,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Splash,
            auth_tab: AuthTab::Login,
            user: seed_user(),
            blood_request: BloodRequestDraft {
                blood_type: BloodType::OPositive,
                units: Units::default(),
                urgency: Urgency::Critical,
                hospital: "City General Hospital".into(),
                contact: "+1 234-567-8900".into(),
            },
            request_in_flight: false,
            reminders: seed_reminders(),
            donors: seed_donors(),
            records: seed_records(),
            recent_scans: seed_recent_scans(),
            record_filter: RecordFilter::All,
            scan_in_progress: false,
            flash_on: false,
            medicine_query: String::new(),
            medicine_results: Vec::new(),
            voice_search_active: false,
            modal: None,
            toasts: Vec::new(),
            network_online: true,
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        let toast = Toast::new(message, kind);
        let id = toast.id;
        self.toasts.push(toast);
        id
    }

    /// Removes an expired toast; false when the id is already gone.
    pub fn dismiss_toast(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() < before
    }

    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    #[must_use]
    pub fn donor(&self, id: &DonorId) -> Option<&Donor> {
        self.donors.iter().find(|donor| &donor.id == id)
    }

    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&MedicalRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn reminder_mut(&mut self, id: ReminderId) -> Option<&mut Reminder> {
        self.reminders.iter_mut().find(|reminder| reminder.id == id)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

// --- Events ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Lifecycle
    AppStarted,
    SplashTimedOut,

    #[cfg(feature = "worker")]
    WorkerRegistered {
        scope: String,
    },
    #[cfg(feature = "worker")]
    WorkerRegistrationFailed {
        reason: String,
    },

    // Auth
    AuthTabSelected(AuthTab),
    LoginSubmitted,
    RegisterSubmitted,

    // Navigation
    ScreenSelected(Screen),
    BackRequested,
    HomeRequested,

    // Ambient input
    KeyPressed {
        ctrl: bool,
        key: char,
    },
    SwipeEnded {
        delta_x: f64,
        delta_y: f64,
    },
    NetworkStatusChanged {
        online: bool,
    },

    // Blood request
    UrgencySelected(Urgency),
    BloodTypeSelected(BloodType),
    UnitsChanged {
        delta: i8,
    },
    BloodRequestSubmitted,
    BloodRequestSucceeded {
        request_id: RequestId,
    },
    BloodRequestRedirectElapsed,

    // Prescription scanning
    ScanRequested,
    ScanSucceeded,
    GalleryImageSelected,
    GalleryProcessingElapsed,
    FlashToggled,

    // Donor map
    DonorSelected {
        id: DonorId,
    },
    ContactDonorRequested {
        id: DonorId,
    },
    DonationRequested {
        id: DonorId,
    },
    DonorFiltersRequested,

    // Medicine search
    MedicineQueryChanged {
        query: String,
    },
    VoiceSearchRequested,
    VoiceSearchCompleted,
    MedicineAddRequested {
        name: String,
    },

    // Reminders
    ReminderToggled {
        id: ReminderId,
    },
    AddReminderRequested,

    // Medical records
    RecordFilterSelected(RecordFilter),
    RecordDownloadRequested {
        id: RecordId,
    },
    RecordDownloadCompleted {
        id: RecordId,
    },
    RecordSearchRequested,

    // Profile
    ProfileActionRequested(ProfileAction),
    LogoutRequested,
    LogoutConfirmed,

    // Emergency
    EmergencyRequested,
    EmergencyCallRequested,
    NotifyContactsRequested,
    ShareLocationRequested,

    // Overlays
    ModalDismissed,
    ToastExpired {
        id: ToastId,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::SplashTimedOut => "splash_timed_out",
            #[cfg(feature = "worker")]
            Self::WorkerRegistered { .. } => "worker_registered",
            #[cfg(feature = "worker")]
            Self::WorkerRegistrationFailed { .. } => "worker_registration_failed",
            Self::AuthTabSelected(_) => "auth_tab_selected",
            Self::LoginSubmitted => "login_submitted",
            Self::RegisterSubmitted => "register_submitted",
            Self::ScreenSelected(_) => "screen_selected",
            Self::BackRequested => "back_requested",
            Self::HomeRequested => "home_requested",
            Self::KeyPressed { .. } => "key_pressed",
            Self::SwipeEnded { .. } => "swipe_ended",
            Self::NetworkStatusChanged { .. } => "network_status_changed",
            Self::UrgencySelected(_) => "urgency_selected",
            Self::BloodTypeSelected(_) => "blood_type_selected",
            Self::UnitsChanged { .. } => "units_changed",
            Self::BloodRequestSubmitted => "blood_request_submitted",
            Self::BloodRequestSucceeded { .. } => "blood_request_succeeded",
            Self::BloodRequestRedirectElapsed => "blood_request_redirect_elapsed",
            Self::ScanRequested => "scan_requested",
            Self::ScanSucceeded => "scan_succeeded",
            Self::GalleryImageSelected => "gallery_image_selected",
            Self::GalleryProcessingElapsed => "gallery_processing_elapsed",
            Self::FlashToggled => "flash_toggled",
            Self::DonorSelected { .. } => "donor_selected",
            Self::ContactDonorRequested { .. } => "contact_donor_requested",
            Self::DonationRequested { .. } => "donation_requested",
            Self::DonorFiltersRequested => "donor_filters_requested",
            Self::MedicineQueryChanged { .. } => "medicine_query_changed",
            Self::VoiceSearchRequested => "voice_search_requested",
            Self::VoiceSearchCompleted => "voice_search_completed",
            Self::MedicineAddRequested { .. } => "medicine_add_requested",
            Self::ReminderToggled { .. } => "reminder_toggled",
            Self::AddReminderRequested => "add_reminder_requested",
            Self::RecordFilterSelected(_) => "record_filter_selected",
            Self::RecordDownloadRequested { .. } => "record_download_requested",
            Self::RecordDownloadCompleted { .. } => "record_download_completed",
            Self::RecordSearchRequested => "record_search_requested",
            Self::ProfileActionRequested(_) => "profile_action_requested",
            Self::LogoutRequested => "logout_requested",
            Self::LogoutConfirmed => "logout_confirmed",
            Self::EmergencyRequested => "emergency_requested",
            Self::EmergencyCallRequested => "emergency_call_requested",
            Self::NotifyContactsRequested => "notify_contacts_requested",
            Self::ShareLocationRequested => "share_location_requested",
            Self::ModalDismissed => "modal_dismissed",
            Self::ToastExpired { .. } => "toast_expired",
        }
    }

    /// Distinguishes direct user actions from timer and shell callbacks.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::AuthTabSelected(_)
                | Self::LoginSubmitted
                | Self::RegisterSubmitted
                | Self::ScreenSelected(_)
                | Self::BackRequested
                | Self::HomeRequested
                | Self::KeyPressed { .. }
                | Self::SwipeEnded { .. }
                | Self::UrgencySelected(_)
                | Self::BloodTypeSelected(_)
                | Self::UnitsChanged { .. }
                | Self::BloodRequestSubmitted
                | Self::ScanRequested
                | Self::GalleryImageSelected
                | Self::FlashToggled
                | Self::DonorSelected { .. }
                | Self::ContactDonorRequested { .. }
                | Self::DonationRequested { .. }
                | Self::DonorFiltersRequested
                | Self::MedicineQueryChanged { .. }
                | Self::VoiceSearchRequested
                | Self::MedicineAddRequested { .. }
                | Self::ReminderToggled { .. }
                | Self::AddReminderRequested
                | Self::RecordFilterSelected(_)
                | Self::RecordDownloadRequested { .. }
                | Self::RecordSearchRequested
                | Self::ProfileActionRequested(_)
                | Self::LogoutRequested
                | Self::LogoutConfirmed
                | Self::EmergencyRequested
                | Self::EmergencyCallRequested
                | Self::NotifyContactsRequested
                | Self::ShareLocationRequested
                | Self::ModalDismissed
        )
    }
}

// --- View model ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastView {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            id: toast.id,
            message: toast.message.clone(),
            kind: toast.kind,
            duration_ms: toast.kind.display_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorView {
    pub id: String,
    pub name: String,
    pub blood_type: String,
    pub distance_text: String,
    pub availability: String,
    pub rating: f32,
    pub last_donation: String,
}

impl From<&Donor> for DonorView {
    fn from(donor: &Donor) -> Self {
        Self {
            id: donor.id.0.clone(),
            name: donor.name.clone(),
            blood_type: donor.blood_type.as_str().to_string(),
            distance_text: format_distance(donor.distance_m),
            availability: donor.availability.as_str().to_string(),
            rating: donor.rating,
            last_donation: donor.last_donation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineView {
    pub name: String,
    pub description: String,
    pub price_text: String,
    pub stock: String,
    pub stock_label: String,
}

impl From<&Medicine> for MedicineView {
    fn from(medicine: &Medicine) -> Self {
        Self {
            name: medicine.name.clone(),
            description: medicine.description.clone(),
            price_text: format_price(medicine.price_cents),
            stock: medicine.stock.as_str().to_string(),
            stock_label: medicine.stock.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderView {
    pub id: u32,
    pub name: String,
    pub frequency: String,
    pub next_dose: String,
    pub active: bool,
    pub icon_class: String,
}

impl From<&Reminder> for ReminderView {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.0,
            name: reminder.name.clone(),
            frequency: reminder.frequency.clone(),
            next_dose: reminder.next_dose.clone(),
            active: reminder.active,
            icon_class: reminder.icon.css_class().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub date: String,
}

impl From<&MedicalRecord> for RecordView {
    fn from(record: &MedicalRecord) -> Self {
        Self {
            id: record.id.0.clone(),
            title: record.title.clone(),
            detail: record.detail.clone(),
            date: record.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentScanView {
    pub name: String,
    pub scanned: String,
}

impl From<&RecentScan> for RecentScanView {
    fn from(scan: &RecentScan) -> Self {
        Self {
            name: scan.name.clone(),
            scanned: scan.scanned.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModalView {
    Emergency,
    DonorProfile { donor: DonorView },
    ConfirmLogout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Splash,
    Auth {
        active_tab: String,
    },
    Home {
        user_name: String,
        blood_type: String,
    },
    BloodRequest {
        blood_type: String,
        units: u8,
        urgency: String,
        hospital: String,
        contact: String,
        sending: bool,
    },
    ScanPrescription {
        scanning: bool,
        flash_on: bool,
        recent_scans: Vec<RecentScanView>,
    },
    SearchMedicine {
        query: String,
        results: Vec<MedicineView>,
        voice_active: bool,
    },
    Reminders {
        items: Vec<ReminderView>,
        active_count: usize,
        adherence_pct: u8,
    },
    MedicalRecords {
        filter: String,
        records: Vec<RecordView>,
    },
    DonorMap {
        donors: Vec<DonorView>,
    },
    Profile {
        name: String,
        email: String,
        blood_type: String,
        phone: String,
        donations: u32,
        rating: f32,
    },
    Lore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub screen_id: String,
    pub nav_index: Option<u8>,
    pub screen: ScreenView,
    pub modal: Option<ModalView>,
    pub toasts: Vec<ToastView>,
    pub online: bool,
}

pub mod app {
    use super::{
        adherence_rate, search_medicines, DonorView, MedicineView, Modal, ModalView, Model,
        RecentScan, RecentScanView, RecordView, ReminderView, RequestId, Screen, ScreenView,
        ToastKind, ToastView, ViewModel, EMERGENCY_NUMBER, GALLERY_PROCESS_DELAY_MS,
        RECORD_DOWNLOAD_DELAY_MS, REQUEST_REDIRECT_DELAY_MS, REQUEST_SEND_DELAY_MS, SCAN_DELAY_MS,
        SEARCH_MIN_QUERY_CHARS, SPLASH_DELAY_MS, SWIPE_BACK_MAX_DY, SWIPE_BACK_MIN_DX,
        VOICE_SEARCH_DELAY_MS, VOICE_SEARCH_QUERY,
    };
    use crate::capabilities::Capabilities;
    use crate::Event;

    #[cfg(feature = "worker")]
    use super::WORKER_SCRIPT_URL;
    #[cfg(feature = "worker")]
    use crate::capabilities::WorkerOutput;

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Pushes a toast and schedules its expiry with the shell.
        fn show_toast(
            model: &mut Model,
            caps: &Capabilities,
            message: impl Into<String>,
            kind: ToastKind,
        ) {
            let id = model.show_toast(message, kind);
            caps.timer
                .after(kind.display_duration_ms(), move |_| Event::ToastExpired {
                    id,
                });
        }

        fn navigate(model: &mut Model, screen: Screen) {
            // Screen entry effects (scan-line, pin and story animations,
            // reminder stats) are all derived in `view`; switching the
            // variant is the whole transition.
            model.screen = screen;
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            tracing::debug!(event = event.name(), "handling event");

            match event {
                Event::AppStarted => {
                    model.screen = Screen::Splash;

                    #[cfg(feature = "worker")]
                    caps.worker.register(WORKER_SCRIPT_URL, |result| match result {
                        Ok(WorkerOutput::Registered { scope }) => Event::WorkerRegistered { scope },
                        Err(e) => Event::WorkerRegistrationFailed {
                            reason: e.to_string(),
                        },
                    });

                    caps.timer.after(SPLASH_DELAY_MS, |_| Event::SplashTimedOut);
                    caps.render.render();
                }

                Event::SplashTimedOut => {
                    Self::navigate(model, Screen::Auth);
                    caps.render.render();
                }

                #[cfg(feature = "worker")]
                Event::WorkerRegistered { scope } => {
                    tracing::info!(%scope, "background worker registered");
                }

                #[cfg(feature = "worker")]
                Event::WorkerRegistrationFailed { reason } => {
                    tracing::warn!(%reason, "background worker registration failed");
                }

                Event::AuthTabSelected(tab) => {
                    model.auth_tab = tab;
                    caps.render.render();
                }

                Event::LoginSubmitted | Event::RegisterSubmitted => {
                    Self::navigate(model, Screen::Home);
                    caps.render.render();
                }

                Event::ScreenSelected(screen) => {
                    Self::navigate(model, screen);
                    caps.render.render();
                }

                Event::BackRequested => {
                    Self::navigate(model, model.screen.back_target());
                    caps.render.render();
                }

                Event::HomeRequested => {
                    self.update(Event::ScreenSelected(Screen::Home), model, caps);
                }

                Event::KeyPressed { ctrl: true, key } => match key {
                    'e' => self.update(Event::EmergencyRequested, model, caps),
                    'h' => self.update(Event::ScreenSelected(Screen::Home), model, caps),
                    'b' => self.update(Event::ScreenSelected(Screen::BloodRequest), model, caps),
                    _ => {}
                },

                Event::KeyPressed { .. } => {}

                Event::SwipeEnded { delta_x, delta_y } => {
                    if delta_x > SWIPE_BACK_MIN_DX
                        && delta_y.abs() < SWIPE_BACK_MAX_DY
                        && model.screen.swipe_back_enabled()
                    {
                        self.update(Event::BackRequested, model, caps);
                    }
                }

                Event::NetworkStatusChanged { online } => {
                    model.network_online = online;
                    if online {
                        Self::show_toast(
                            model,
                            caps,
                            "Connection restored. All features are available.",
                            ToastKind::Success,
                        );
                    } else {
                        Self::show_toast(
                            model,
                            caps,
                            "You are offline. Some features may be limited.",
                            ToastKind::Error,
                        );
                    }
                    caps.render.render();
                }

                Event::UrgencySelected(urgency) => {
                    model.blood_request.urgency = urgency;
                    caps.render.render();
                }

                Event::BloodTypeSelected(blood_type) => {
                    model.blood_request.blood_type = blood_type;
                    caps.render.render();
                }

                Event::UnitsChanged { delta } => {
                    model.blood_request.units = model.blood_request.units.stepped(delta);
                    caps.render.render();
                }

                Event::BloodRequestSubmitted => {
                    // The submit button is disabled while a request is in
                    // flight; a second submission is dropped.
                    if model.request_in_flight {
                        return;
                    }
                    model.request_in_flight = true;
                    let request_id = RequestId::generate();
                    caps.timer.after(REQUEST_SEND_DELAY_MS, move |_| {
                        Event::BloodRequestSucceeded { request_id }
                    });
                    caps.render.render();
                }

                Event::BloodRequestSucceeded { request_id } => {
                    model.request_in_flight = false;
                    tracing::info!(request_id = %request_id, "blood request acknowledged");
                    Self::show_toast(
                        model,
                        caps,
                        "Emergency blood request sent successfully! Donors are being notified.",
                        ToastKind::Success,
                    );
                    caps.timer.after(REQUEST_REDIRECT_DELAY_MS, |_| {
                        Event::BloodRequestRedirectElapsed
                    });
                    caps.render.render();
                }

                Event::BloodRequestRedirectElapsed => {
                    self.update(Event::ScreenSelected(Screen::DonorMap), model, caps);
                }

                Event::ScanRequested => {
                    if model.scan_in_progress {
                        return;
                    }
                    model.scan_in_progress = true;
                    caps.timer.after(SCAN_DELAY_MS, |_| Event::ScanSucceeded);
                    caps.render.render();
                }

                Event::ScanSucceeded => {
                    model.scan_in_progress = false;
                    Self::show_toast(
                        model,
                        caps,
                        "Prescription scanned successfully! Added to your medical records.",
                        ToastKind::Success,
                    );
                    // Newest scan goes to the top of the list.
                    model.recent_scans.insert(
                        0,
                        RecentScan {
                            name: "Heart Medication".into(),
                            scanned: "Just now".into(),
                        },
                    );
                    caps.render.render();
                }

                Event::GalleryImageSelected => {
                    Self::show_toast(
                        model,
                        caps,
                        "Image selected from gallery. Processing...",
                        ToastKind::Success,
                    );
                    caps.timer.after(GALLERY_PROCESS_DELAY_MS, |_| {
                        Event::GalleryProcessingElapsed
                    });
                    caps.render.render();
                }

                Event::GalleryProcessingElapsed => {
                    self.update(Event::ScanRequested, model, caps);
                }

                Event::FlashToggled => {
                    model.flash_on = !model.flash_on;
                    caps.render.render();
                }

                Event::DonorSelected { id } => {
                    if model.donor(&id).is_some() {
                        model.open_modal(Modal::DonorProfile(id));
                    } else {
                        tracing::warn!(donor_id = %id, "donor not found");
                    }
                    caps.render.render();
                }

                Event::ContactDonorRequested { id } => {
                    let Some(name) = model.donor(&id).map(|donor| donor.name.clone()) else {
                        tracing::warn!(donor_id = %id, "donor not found");
                        return;
                    };
                    model.close_modal();
                    Self::show_toast(model, caps, format!("Calling {name}..."), ToastKind::Success);
                    caps.render.render();
                }

                Event::DonationRequested { id } => {
                    let Some(name) = model.donor(&id).map(|donor| donor.name.clone()) else {
                        tracing::warn!(donor_id = %id, "donor not found");
                        return;
                    };
                    model.close_modal();
                    Self::show_toast(
                        model,
                        caps,
                        format!(
                            "Donation request sent to {name}. They will be notified immediately."
                        ),
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::DonorFiltersRequested => {
                    Self::show_toast(
                        model,
                        caps,
                        "Filter options: Blood type, Distance, Availability",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::MedicineQueryChanged { query } => {
                    model.medicine_query = query;
                    // Short queries do not search; previous results stay up.
                    if model.medicine_query.chars().count() > SEARCH_MIN_QUERY_CHARS {
                        model.medicine_results = search_medicines(&model.medicine_query);
                    }
                    caps.render.render();
                }

                Event::VoiceSearchRequested => {
                    if model.voice_search_active {
                        return;
                    }
                    model.voice_search_active = true;
                    caps.timer
                        .after(VOICE_SEARCH_DELAY_MS, |_| Event::VoiceSearchCompleted);
                    caps.render.render();
                }

                Event::VoiceSearchCompleted => {
                    model.voice_search_active = false;
                    self.update(
                        Event::MedicineQueryChanged {
                            query: VOICE_SEARCH_QUERY.to_string(),
                        },
                        model,
                        caps,
                    );
                }

                Event::MedicineAddRequested { name } => {
                    // Nothing is persisted; the confirmation is the feature.
                    Self::show_toast(
                        model,
                        caps,
                        format!("{name} added to your medical records."),
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::ReminderToggled { id } => {
                    if let Some(reminder) = model.reminder_mut(id) {
                        reminder.active = !reminder.active;
                    } else {
                        tracing::warn!(reminder_id = %id, "reminder not found");
                    }
                    caps.render.render();
                }

                Event::AddReminderRequested => {
                    Self::show_toast(
                        model,
                        caps,
                        "Add Reminder feature coming soon!",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::RecordFilterSelected(filter) => {
                    model.record_filter = filter;
                    caps.render.render();
                }

                Event::RecordDownloadRequested { id } => {
                    let message = format!("Downloading {id}...");
                    Self::show_toast(model, caps, message, ToastKind::Success);
                    caps.timer.after(RECORD_DOWNLOAD_DELAY_MS, move |_| {
                        Event::RecordDownloadCompleted { id }
                    });
                    caps.render.render();
                }

                Event::RecordDownloadCompleted { id } => {
                    tracing::debug!(record_id = %id, "record download finished");
                    Self::show_toast(
                        model,
                        caps,
                        "Record downloaded successfully!",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::RecordSearchRequested => {
                    Self::show_toast(
                        model,
                        caps,
                        "Search functionality coming soon!",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::ProfileActionRequested(action) => {
                    Self::show_toast(model, caps, action.placeholder_message(), ToastKind::Success);
                    caps.render.render();
                }

                Event::LogoutRequested => {
                    model.open_modal(Modal::ConfirmLogout);
                    caps.render.render();
                }

                Event::LogoutConfirmed => {
                    model.close_modal();
                    Self::navigate(model, Screen::Auth);
                    Self::show_toast(
                        model,
                        caps,
                        "You have been logged out successfully.",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::EmergencyRequested => {
                    model.open_modal(Modal::Emergency);
                    caps.render.render();
                }

                Event::EmergencyCallRequested => {
                    model.close_modal();
                    Self::show_toast(
                        model,
                        caps,
                        format!("Calling Emergency Services ({EMERGENCY_NUMBER})..."),
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::NotifyContactsRequested => {
                    model.close_modal();
                    Self::show_toast(
                        model,
                        caps,
                        "Notifying emergency contacts...",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::ShareLocationRequested => {
                    model.close_modal();
                    Self::show_toast(
                        model,
                        caps,
                        "Sharing current location with emergency contacts...",
                        ToastKind::Success,
                    );
                    caps.render.render();
                }

                Event::ModalDismissed => {
                    model.close_modal();
                    caps.render.render();
                }

                Event::ToastExpired { id } => {
                    // Expiry for a toast that is already gone is a no-op.
                    if model.dismiss_toast(id) {
                        caps.render.render();
                    }
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let screen = match model.screen {
                Screen::Splash => ScreenView::Splash,

                Screen::Auth => ScreenView::Auth {
                    active_tab: model.auth_tab.as_str().to_string(),
                },

                Screen::Home => ScreenView::Home {
                    user_name: model.user.name.clone(),
                    blood_type: model.user.blood_type.as_str().to_string(),
                },

                Screen::BloodRequest => ScreenView::BloodRequest {
                    blood_type: model.blood_request.blood_type.as_str().to_string(),
                    units: model.blood_request.units.get(),
                    urgency: model.blood_request.urgency.as_str().to_string(),
                    hospital: model.blood_request.hospital.clone(),
                    contact: model.blood_request.contact.clone(),
                    sending: model.request_in_flight,
                },

                Screen::ScanPrescription => ScreenView::ScanPrescription {
                    scanning: model.scan_in_progress,
                    flash_on: model.flash_on,
                    recent_scans: model
                        .recent_scans
                        .iter()
                        .map(RecentScanView::from)
                        .collect(),
                },

                Screen::SearchMedicine => ScreenView::SearchMedicine {
                    query: model.medicine_query.clone(),
                    results: model
                        .medicine_results
                        .iter()
                        .map(MedicineView::from)
                        .collect(),
                    voice_active: model.voice_search_active,
                },

                Screen::Reminders => ScreenView::Reminders {
                    items: model.reminders.iter().map(ReminderView::from).collect(),
                    active_count: model.reminders.iter().filter(|r| r.active).count(),
                    adherence_pct: adherence_rate(&model.reminders),
                },

                Screen::MedicalRecords => ScreenView::MedicalRecords {
                    filter: model.record_filter.as_str().to_string(),
                    records: model
                        .records
                        .iter()
                        .filter(|record| model.record_filter.matches(&record.title))
                        .map(RecordView::from)
                        .collect(),
                },

                Screen::DonorMap => ScreenView::DonorMap {
                    donors: model.donors.iter().map(DonorView::from).collect(),
                },

                Screen::Profile => ScreenView::Profile {
                    name: model.user.name.clone(),
                    email: model.user.email.clone(),
                    blood_type: model.user.blood_type.as_str().to_string(),
                    phone: model.user.phone.clone(),
                    donations: model.user.donations,
                    rating: model.user.rating,
                },

                Screen::Lore => ScreenView::Lore,
            };

            let modal = model.modal.as_ref().and_then(|modal| match modal {
                Modal::Emergency => Some(ModalView::Emergency),
                Modal::ConfirmLogout => Some(ModalView::ConfirmLogout),
                Modal::DonorProfile(id) => model.donor(id).map(|donor| ModalView::DonorProfile {
                    donor: DonorView::from(donor),
                }),
            });

            ViewModel {
                screen_id: model.screen.as_str().to_string(),
                nav_index: model.screen.nav_index(),
                screen,
                modal,
                toasts: model.toasts.iter().map(ToastView::from).collect(),
                online: model.network_online,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod screen_tests {
        use super::*;

        #[test]
        fn test_ids_round_trip() {
            for screen in Screen::ALL {
                assert_eq!(Screen::from_str(screen.as_str()), Some(screen));
            }
        }

        #[test]
        fn test_unknown_id_is_rejected() {
            assert_eq!(Screen::from_str("settings-screen"), None);
            assert_eq!(Screen::from_str(""), None);
        }

        #[test]
        fn test_nav_table() {
            assert_eq!(Screen::Home.nav_index(), Some(0));
            assert_eq!(Screen::DonorMap.nav_index(), Some(1));
            assert_eq!(Screen::BloodRequest.nav_index(), Some(2));
            assert_eq!(Screen::MedicalRecords.nav_index(), Some(3));
            assert_eq!(Screen::Profile.nav_index(), Some(4));
            assert_eq!(Screen::Splash.nav_index(), None);
            assert_eq!(Screen::Auth.nav_index(), None);
            assert_eq!(Screen::Reminders.nav_index(), None);
            assert_eq!(Screen::Lore.nav_index(), None);
        }

        #[test]
        fn test_every_screen_falls_back_to_home() {
            for screen in Screen::ALL {
                assert_eq!(screen.back_target(), Screen::Home);
            }
        }

        #[test]
        fn test_swipe_back_gating() {
            assert!(!Screen::Home.swipe_back_enabled());
            assert!(!Screen::Splash.swipe_back_enabled());
            assert!(!Screen::Auth.swipe_back_enabled());
            assert!(Screen::BloodRequest.swipe_back_enabled());
            assert!(Screen::DonorMap.swipe_back_enabled());
            assert!(Screen::Lore.swipe_back_enabled());
        }
    }

    mod units_tests {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn test_default_units() {
            assert_eq!(Units::default().get(), DEFAULT_UNITS);
        }

        #[test]
        fn test_new_enforces_bounds() {
            assert!(Units::new(0).is_err());
            assert!(Units::new(1).is_ok());
            assert!(Units::new(10).is_ok());
            assert!(Units::new(11).is_err());
        }

        #[test]
        fn test_increment_from_baseline() {
            // Five +1 steps from 2 land on 7.
            let mut units = Units::default();
            for _ in 0..5 {
                units = units.stepped(1);
            }
            assert_eq!(units.get(), 7);
        }

        #[test]
        fn test_decrement_saturates_at_minimum() {
            // Eight -1 steps from 1 stay at 1.
            let mut units = Units::new(1).unwrap();
            for _ in 0..8 {
                units = units.stepped(-1);
            }
            assert_eq!(units.get(), 1);
        }

        #[test]
        fn test_increment_saturates_at_maximum() {
            let mut units = Units::new(9).unwrap();
            for _ in 0..4 {
                units = units.stepped(1);
            }
            assert_eq!(units.get(), MAX_UNITS);
        }

        proptest! {
            #[test]
            fn units_never_leave_range(deltas in proptest::collection::vec(-3i8..=3, 0..64)) {
                let mut units = Units::default();
                for delta in deltas {
                    units = units.stepped(delta);
                    prop_assert!((MIN_UNITS..=MAX_UNITS).contains(&units.get()));
                }
            }
        }
    }

    mod blood_type_tests {
        use super::*;

        #[test]
        fn test_round_trip() {
            for blood_type in BloodType::ALL {
                assert_eq!(BloodType::from_str(blood_type.as_str()), Some(blood_type));
            }
        }

        #[test]
        fn test_unknown_is_rejected() {
            assert_eq!(BloodType::from_str("C+"), None);
            assert_eq!(BloodType::from_str("o+"), None);
        }
    }

    mod search_tests {
        use super::*;

        #[test]
        fn test_matches_name() {
            let results = search_medicines("paracetamol");
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].name, "Paracetamol 500mg");
        }

        #[test]
        fn test_matches_description() {
            // "pain" hits both Paracetamol and Ibuprofen via descriptions.
            let results = search_medicines("pain");
            let names: Vec<&str> = results.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["Paracetamol 500mg", "Ibuprofen 400mg"]);
        }

        #[test]
        fn test_is_case_insensitive() {
            assert_eq!(search_medicines("ASPIRIN").len(), 1);
            assert_eq!(search_medicines("Heart").len(), 1);
        }

        #[test]
        fn test_no_match_is_empty() {
            assert!(search_medicines("amoxicillin").is_empty());
        }
    }

    mod reminder_tests {
        use super::*;

        #[test]
        fn test_adherence_all_active() {
            assert_eq!(adherence_rate(&seed_reminders()), 100);
        }

        #[test]
        fn test_adherence_partial() {
            let mut reminders = seed_reminders();
            reminders[0].active = false;
            // 2 of 3 active rounds to 67.
            assert_eq!(adherence_rate(&reminders), 67);
        }

        #[test]
        fn test_adherence_none_active() {
            let mut reminders = seed_reminders();
            for reminder in &mut reminders {
                reminder.active = false;
            }
            assert_eq!(adherence_rate(&reminders), 0);
        }

        #[test]
        fn test_adherence_empty_list() {
            assert_eq!(adherence_rate(&[]), 0);
        }
    }

    mod record_filter_tests {
        use super::*;

        #[test]
        fn test_all_matches_everything() {
            assert!(RecordFilter::All.matches("anything at all"));
        }

        #[test]
        fn test_keyword_matching() {
            assert!(RecordFilter::Prescriptions.matches("Prescription - Lisinopril 10mg"));
            assert!(RecordFilter::Tests.matches("Blood Test Results"));
            assert!(RecordFilter::Visits.matches("Annual Physical Exam"));
            assert!(!RecordFilter::Prescriptions.matches("Blood Test Results"));
            assert!(!RecordFilter::Visits.matches("Blood Test Results"));
        }

        #[test]
        fn test_matching_is_case_insensitive() {
            assert!(RecordFilter::Tests.matches("ALLERGY TEST PANEL"));
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_distance_meters() {
            assert_eq!(format_distance(0), "0 m");
            assert_eq!(format_distance(850), "850 m");
            assert_eq!(format_distance(999), "999 m");
        }

        #[test]
        fn test_format_distance_kilometers() {
            assert_eq!(format_distance(1_800), "1.8 km");
            assert_eq!(format_distance(2_300), "2.3 km");
            assert_eq!(format_distance(3_700), "3.7 km");
            assert_eq!(format_distance(12_000), "12 km");
        }

        #[test]
        fn test_format_price() {
            assert_eq!(format_price(899), "$8.99");
            assert_eq!(format_price(1_250), "$12.50");
            assert_eq!(format_price(1_025), "$10.25");
            assert_eq!(format_price(100), "$1.00");
        }
    }

    mod model_tests {
        use super::*;

        #[test]
        fn test_toast_push_and_dismiss() {
            let mut model = Model::new();
            let id = model.show_toast("saved", ToastKind::Success);
            assert_eq!(model.toasts.len(), 1);
            assert!(model.dismiss_toast(id));
            assert!(model.toasts.is_empty());
        }

        #[test]
        fn test_dismissing_unknown_toast_is_noop() {
            let mut model = Model::new();
            model.show_toast("saved", ToastKind::Success);
            assert!(!model.dismiss_toast(ToastId::generate()));
            assert_eq!(model.toasts.len(), 1);
        }

        #[test]
        fn test_toasts_stack() {
            let mut model = Model::new();
            model.show_toast("one", ToastKind::Success);
            model.show_toast("two", ToastKind::Error);
            assert_eq!(model.toasts.len(), 2);
        }

        #[test]
        fn test_single_modal_at_a_time() {
            let mut model = Model::new();
            model.open_modal(Modal::Emergency);
            model.open_modal(Modal::ConfirmLogout);
            assert_eq!(model.modal, Some(Modal::ConfirmLogout));
            model.close_modal();
            assert_eq!(model.modal, None);
        }

        #[test]
        fn test_donor_lookup() {
            let model = Model::new();
            assert_eq!(
                model
                    .donor(&DonorId::new("donor2"))
                    .map(|donor| donor.name.as_str()),
                Some("Michael Chen")
            );
            assert!(model.donor(&DonorId::new("donor99")).is_none());
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn test_event_names() {
            assert_eq!(Event::AppStarted.name(), "app_started");
            assert_eq!(Event::BackRequested.name(), "back_requested");
            assert_eq!(
                Event::ToastExpired {
                    id: ToastId::generate()
                }
                .name(),
                "toast_expired"
            );
        }

        #[test]
        fn test_user_initiated_split() {
            assert!(Event::BloodRequestSubmitted.is_user_initiated());
            assert!(Event::EmergencyRequested.is_user_initiated());
            assert!(!Event::SplashTimedOut.is_user_initiated());
            assert!(!Event::ScanSucceeded.is_user_initiated());
            assert!(!Event::ToastExpired {
                id: ToastId::generate()
            }
            .is_user_initiated());
        }
    }

    mod update_tests {
        use super::*;
        use crate::capabilities::TimerOperation;
        use crux_core::testing::AppTester;

        fn tester() -> AppTester<App, Effect> {
            AppTester::default()
        }

        #[test]
        fn test_start_schedules_splash_handoff() {
            let app = tester();
            let mut model = Model::default();

            let update = app.update(Event::AppStarted, &mut model);

            assert_eq!(model.screen, Screen::Splash);
            let timer = update.effects.iter().find_map(|effect| match effect {
                Effect::Timer(request) => Some(request.operation.clone()),
                _ => None,
            });
            assert_eq!(
                timer,
                Some(TimerOperation::Start {
                    millis: SPLASH_DELAY_MS
                })
            );
            assert!(update
                .effects
                .iter()
                .any(|effect| matches!(effect, Effect::Render(_))));
        }

        #[test]
        fn test_double_submit_is_dropped() {
            let app = tester();
            let mut model = Model::default();

            app.update(Event::BloodRequestSubmitted, &mut model);
            assert!(model.request_in_flight);

            let update = app.update(Event::BloodRequestSubmitted, &mut model);
            assert!(update.effects.is_empty());
        }

        #[test]
        fn test_short_query_keeps_previous_results() {
            let app = tester();
            let mut model = Model::default();

            app.update(
                Event::MedicineQueryChanged {
                    query: "aspirin".into(),
                },
                &mut model,
            );
            assert_eq!(model.medicine_results.len(), 1);

            app.update(
                Event::MedicineQueryChanged { query: "as".into() },
                &mut model,
            );
            assert_eq!(model.medicine_query, "as");
            assert_eq!(model.medicine_results.len(), 1);
        }

        #[test]
        fn test_voice_search_fills_query_and_searches() {
            let app = tester();
            let mut model = Model::default();

            app.update(Event::VoiceSearchRequested, &mut model);
            assert!(model.voice_search_active);

            app.update(Event::VoiceSearchCompleted, &mut model);
            assert!(!model.voice_search_active);
            assert_eq!(model.medicine_query, VOICE_SEARCH_QUERY);
            assert_eq!(model.medicine_results.len(), 1);
        }

        #[test]
        fn test_toast_expiry_roundtrip() {
            let app = tester();
            let mut model = Model::default();

            let update = app.update(Event::DonorFiltersRequested, &mut model);
            assert_eq!(model.toasts.len(), 1);
            let id = model.toasts[0].id;

            let timer = update.effects.iter().find_map(|effect| match effect {
                Effect::Timer(request) => Some(request.operation.clone()),
                _ => None,
            });
            assert_eq!(
                timer,
                Some(TimerOperation::Start {
                    millis: ToastKind::Success.display_duration_ms()
                })
            );

            app.update(Event::ToastExpired { id }, &mut model);
            assert!(model.toasts.is_empty());

            // A late duplicate expiry changes nothing and renders nothing.
            let update = app.update(Event::ToastExpired { id }, &mut model);
            assert!(update.effects.is_empty());
        }

        #[test]
        fn test_swipe_back_thresholds() {
            let app = tester();
            let mut model = Model::default();
            model.screen = Screen::Reminders;

            // Too much vertical drift.
            app.update(
                Event::SwipeEnded {
                    delta_x: 150.0,
                    delta_y: 120.0,
                },
                &mut model,
            );
            assert_eq!(model.screen, Screen::Reminders);

            // Too short.
            app.update(
                Event::SwipeEnded {
                    delta_x: 80.0,
                    delta_y: 0.0,
                },
                &mut model,
            );
            assert_eq!(model.screen, Screen::Reminders);

            app.update(
                Event::SwipeEnded {
                    delta_x: 150.0,
                    delta_y: 20.0,
                },
                &mut model,
            );
            assert_eq!(model.screen, Screen::Home);
        }

        #[test]
        fn test_swipe_back_suppressed_on_entry_screens() {
            let app = tester();
            let mut model = Model::default();
            model.screen = Screen::Auth;

            app.update(
                Event::SwipeEnded {
                    delta_x: 300.0,
                    delta_y: 0.0,
                },
                &mut model,
            );
            assert_eq!(model.screen, Screen::Auth);
        }

        #[test]
        fn test_network_status_toasts() {
            let app = tester();
            let mut model = Model::default();

            app.update(Event::NetworkStatusChanged { online: false }, &mut model);
            assert!(!model.network_online);
            assert_eq!(model.toasts.len(), 1);
            assert_eq!(model.toasts[0].kind, ToastKind::Error);

            app.update(Event::NetworkStatusChanged { online: true }, &mut model);
            assert!(model.network_online);
            assert_eq!(model.toasts.len(), 2);
            assert_eq!(model.toasts[1].kind, ToastKind::Success);
        }

        #[test]
        fn test_unknown_donor_is_ignored() {
            let app = tester();
            let mut model = Model::default();
            model.screen = Screen::DonorMap;

            app.update(
                Event::DonorSelected {
                    id: DonorId::new("donor99"),
                },
                &mut model,
            );
            assert_eq!(model.modal, None);
        }

        #[test]
        fn test_scan_prepends_recent_entry() {
            let app = tester();
            let mut model = Model::default();
            let seeded = model.recent_scans.len();

            app.update(Event::ScanRequested, &mut model);
            assert!(model.scan_in_progress);

            app.update(Event::ScanSucceeded, &mut model);
            assert!(!model.scan_in_progress);
            assert_eq!(model.recent_scans.len(), seeded + 1);
            assert_eq!(model.recent_scans[0].name, "Heart Medication");
            assert_eq!(model.recent_scans[0].scanned, "Just now");
        }

        #[test]
        fn test_reminder_toggle_feeds_adherence() {
            let app = tester();
            let mut model = Model::default();

            app.update(Event::ReminderToggled { id: ReminderId(2) }, &mut model);
            assert!(!model.reminders[1].active);
            assert_eq!(adherence_rate(&model.reminders), 67);

            app.update(Event::ReminderToggled { id: ReminderId(2) }, &mut model);
            assert!(model.reminders[1].active);
            assert_eq!(adherence_rate(&model.reminders), 100);
        }
    }
}
