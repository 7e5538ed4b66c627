//! Dose report data model.
//!
//! Dose values are carried as the decimal text shown on the screen. The
//! numeric accessors parse them on demand.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Helical,
    Axial,
    Localizer,
    Stationary,
    #[default]
    Unknown,
}

impl ScanType {
    /// Map a scan-type word as printed by any of the supported vendors.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "helical" | "spiral" | "flash" => ScanType::Helical,
            "axial" | "sequence" | "seq" | "volume" => ScanType::Axial,
            "scout" | "topogram" | "scanogram" | "localizer" => ScanType::Localizer,
            "stationary" | "cine" | "smartprep" | "realprep" | "monitoring" => {
                ScanType::Stationary
            }
            _ => ScanType::Unknown,
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanType::Helical => "Helical",
            ScanType::Axial => "Axial",
            ScanType::Localizer => "Localizer",
            ScanType::Stationary => "Stationary",
            ScanType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Dosimetry phantom the CTDIvol refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhantomType {
    Body,
    Head,
    #[default]
    Unknown,
}

impl PhantomType {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "body" | "body32" | "body 32" => PhantomType::Body,
            "head" | "head16" | "head 16" => PhantomType::Head,
            _ => PhantomType::Unknown,
        }
    }
}

impl fmt::Display for PhantomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhantomType::Body => "Body",
            PhantomType::Head => "Head",
            PhantomType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Superior,
    Inferior,
}

impl Side {
    /// `S` or `I`, as printed in front of a table position.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "S" | "s" => Some(Side::Superior),
            "I" | "i" => Some(Side::Inferior),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPosition {
    pub side: Side,
    pub location: String,
}

impl ScanPosition {
    pub fn new(side: Side, location: impl Into<String>) -> Self {
        Self { side, location: location.into() }
    }

    /// Position on a head-positive axis, when the location parses.
    fn signed(&self) -> Option<f64> {
        let value: f64 = self.location.parse().ok()?;
        Some(match self.side {
            Side::Superior => value,
            Side::Inferior => -value,
        })
    }
}

impl fmt::Display for ScanPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.side {
            Side::Superior => 'S',
            Side::Inferior => 'I',
        };
        write!(f, "{}{}", letter, self.location)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    CranioCaudal,
    CaudoCranial,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    pub start: ScanPosition,
    pub end: ScanPosition,
}

impl ScanRange {
    pub fn new(start: ScanPosition, end: ScanPosition) -> Self {
        Self { start, end }
    }

    /// `None` when either location is not a number.
    pub fn direction(&self) -> Option<ScanDirection> {
        let start = self.start.signed()?;
        let end = self.end.signed()?;
        Some(if end <= start {
            ScanDirection::CranioCaudal
        } else {
            ScanDirection::CaudoCranial
        })
    }
}

/// Exposure parameters some vendors print next to the dose values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kvp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_mas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_mas: Option<String>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_reduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseAcquisitionRecord {
    pub scan_type: ScanType,
    pub scan_range: Option<ScanRange>,
    /// mGy
    pub ctdi_vol: Option<String>,
    /// mGy.cm
    pub dlp: Option<String>,
    pub phantom: PhantomType,
    #[serde(default)]
    pub details: AcquisitionDetails,
}

impl DoseAcquisitionRecord {
    pub fn ctdi_vol_value(&self) -> Option<f64> {
        self.ctdi_vol.as_deref()?.parse().ok()
    }

    pub fn dlp_value(&self) -> Option<f64> {
        self.dlp.as_deref()?.parse().ok()
    }

    /// Both CTDIvol and DLP have been read.
    pub fn has_dose(&self) -> bool {
        self.ctdi_vol.is_some() && self.dlp.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalDlp {
    pub overall: Option<String>,
    pub body: Option<String>,
    pub head: Option<String>,
}

impl TotalDlp {
    fn value(field: &Option<String>) -> Option<f64> {
        field.as_deref()?.parse().ok()
    }

    /// The overall total, or the sum of the per-phantom totals.
    pub fn effective(&self) -> Option<f64> {
        if let Some(overall) = Self::value(&self.overall) {
            return Some(overall);
        }
        match (Self::value(&self.body), Self::value(&self.head)) {
            (None, None) => None,
            (body, head) => Some(body.unwrap_or(0.0) + head.unwrap_or(0.0)),
        }
    }

    pub fn set(&mut self, phantom: PhantomType, value: String) {
        match phantom {
            PhantomType::Body => self.body = Some(value),
            PhantomType::Head => self.head = Some(value),
            PhantomType::Unknown => self.overall = Some(value),
        }
    }
}

/// A reported total DLP that disagrees with the acquisitions read.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DlpDiscrepancy {
    pub reported: f64,
    pub summed: f64,
}

impl fmt::Display for DlpDiscrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reported total DLP {:.2} but acquisitions sum to {:.2}",
            self.reported, self.summed
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseReport {
    pub scope: String,
    pub total_dlp: TotalDlp,
    pub acquisitions: Vec<DoseAcquisitionRecord>,
}

impl DoseReport {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// Cross-check the reported total against the acquisitions.
    ///
    /// Tolerance is 1% of the total, and never less than 1 mGy.cm. Returns
    /// `None` when they agree or when no total was read.
    pub fn check_total(&self) -> Option<DlpDiscrepancy> {
        let reported = self.total_dlp.effective()?;
        let summed: f64 = self.acquisitions.iter().filter_map(|a| a.dlp_value()).sum();
        let tolerance = (reported.abs() * 0.01).max(1.0);
        ((reported - summed).abs() > tolerance).then_some(DlpDiscrepancy { reported, summed })
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

impl fmt::Display for DoseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scope: {}", self.scope)?;
        writeln!(
            f,
            "Total DLP: {} (body {}, head {})",
            or_dash(self.total_dlp.overall.as_deref()),
            or_dash(self.total_dlp.body.as_deref()),
            or_dash(self.total_dlp.head.as_deref())
        )?;
        for (i, acq) in self.acquisitions.iter().enumerate() {
            let range = acq
                .scan_range
                .as_ref()
                .map(|r| format!("{}-{}", r.start, r.end))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:>3}  {:<10} {:<24} CTDIvol {:>8}  DLP {:>9}  {}",
                i + 1,
                acq.scan_type.to_string(),
                range,
                or_dash(acq.ctdi_vol.as_deref()),
                or_dash(acq.dlp.as_deref()),
                acq.phantom
            )?;
        }
        Ok(())
    }
}
