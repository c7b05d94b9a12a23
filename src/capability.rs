use std::fmt;
use std::str::FromStr;

/// IviFgen capability groups from IVI-4.3: IviFgen Class Specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityGroup {
    Base,
    StdFunc,
    ArbWfm,
    ArbFrequency,
    ArbSeq,
    Trigger,
    StartTrigger,
    StopTrigger,
    HoldTrigger,
    ResumeTrigger,
    AdvanceTrigger,
    InternalTrigger,
    SoftwareTrigger,
    Burst,
    ModulateAM,
    ModulateFM,
    SampleClock,
    TerminalConfiguration,
    DataMarker,
    SparseMarker,
    ArbWfmBinary,
    ArbDataMask,
    ArbChannelWfm,
    ArbSeqDepth,
    ArbWfmSize64,
}

impl CapabilityGroup {
    pub const ALL: [Self; 25] = [
        Self::Base,
        Self::StdFunc,
        Self::ArbWfm,
        Self::ArbFrequency,
        Self::ArbSeq,
        Self::Trigger,
        Self::StartTrigger,
        Self::StopTrigger,
        Self::HoldTrigger,
        Self::ResumeTrigger,
        Self::AdvanceTrigger,
        Self::InternalTrigger,
        Self::SoftwareTrigger,
        Self::Burst,
        Self::ModulateAM,
        Self::ModulateFM,
        Self::SampleClock,
        Self::TerminalConfiguration,
        Self::DataMarker,
        Self::SparseMarker,
        Self::ArbWfmBinary,
        Self::ArbDataMask,
        Self::ArbChannelWfm,
        Self::ArbSeqDepth,
        Self::ArbWfmSize64,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "IviFgenBase",
            Self::StdFunc => "IviFgenStdFunc",
            Self::ArbWfm => "IviFgenArbWfm",
            Self::ArbFrequency => "IviFgenArbFrequency",
            Self::ArbSeq => "IviFgenArbSeq",
            Self::Trigger => "IviFgenTrigger",
            Self::StartTrigger => "IviFgenStartTrigger",
            Self::StopTrigger => "IviFgenStopTrigger",
            Self::HoldTrigger => "IviFgenHoldTrigger",
            Self::ResumeTrigger => "IviFgenResumeTrigger",
            Self::AdvanceTrigger => "IviFgenAdvanceTrigger",
            Self::InternalTrigger => "IviFgenInternalTrigger",
            Self::SoftwareTrigger => "IviFgenSoftwareTrigger",
            Self::Burst => "IviFgenBurst",
            Self::ModulateAM => "IviFgenModulateAM",
            Self::ModulateFM => "IviFgenModulateFM",
            Self::SampleClock => "IviFgenSampleClock",
            Self::TerminalConfiguration => "IviFgenTerminalConfiguration",
            Self::DataMarker => "IviFgenDataMarker",
            Self::SparseMarker => "IviFgenSparseMarker",
            Self::ArbWfmBinary => "IviFgenArbWfmBinary",
            Self::ArbDataMask => "IviFgenArbDataMask",
            Self::ArbChannelWfm => "IviFgenArbChannelWfm",
            Self::ArbSeqDepth => "IviFgenArbSeqDepth",
            Self::ArbWfmSize64 => "IviFgenArbWfmSize64",
        }
    }
}

impl fmt::Display for CapabilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown IviFgen capability group '{0}'")]
pub struct UnknownCapabilityGroup(pub String);

impl FromStr for CapabilityGroup {
    type Err = UnknownCapabilityGroup;

    /// Accepts `IviFgenBurst`, `FgenBurst` and any casing of either.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let wanted = match name.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ivi") => &name[3..],
            _ => name,
        };

        Self::ALL
            .into_iter()
            .find(|group| group.as_str()[3..].eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCapabilityGroup(s.to_string()))
    }
}

/// Class-specification metadata every IVI driver reports through its
/// inherent attributes. Declared once per model as a `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpecification {
    major_version: u32,
    minor_version: u32,
    revision: &'static str,
    capability_groups: &'static [CapabilityGroup],
    supported_models: &'static [&'static str],
}

impl ClassSpecification {
    /// Build a class specification.
    ///
    /// Meant for `const` items: an empty model list, an empty or duplicated
    /// group list, or one missing `IviFgenBase` fails constant evaluation.
    pub const fn new(
        major_version: u32,
        minor_version: u32,
        revision: &'static str,
        capability_groups: &'static [CapabilityGroup],
        supported_models: &'static [&'static str],
    ) -> Self {
        assert!(
            !supported_models.is_empty(),
            "at least one supported instrument model is required"
        );
        assert!(
            !capability_groups.is_empty(),
            "at least one capability group is required"
        );

        let mut has_base = false;
        let mut i = 0;
        while i < capability_groups.len() {
            if capability_groups[i] as u8 == CapabilityGroup::Base as u8 {
                has_base = true;
            }
            let mut j = i + 1;
            while j < capability_groups.len() {
                assert!(
                    capability_groups[i] as u8 != capability_groups[j] as u8,
                    "duplicate capability group"
                );
                j += 1;
            }
            i += 1;
        }
        assert!(has_base, "IviFgenBase capability group is required");

        Self {
            major_version,
            minor_version,
            revision,
            capability_groups,
            supported_models,
        }
    }

    pub const fn major_version(&self) -> u32 {
        self.major_version
    }

    pub const fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub const fn revision(&self) -> &'static str {
        self.revision
    }

    pub const fn capability_groups(&self) -> &'static [CapabilityGroup] {
        self.capability_groups
    }

    pub const fn supported_models(&self) -> &'static [&'static str] {
        self.supported_models
    }

    pub fn supports(&self, group: CapabilityGroup) -> bool {
        self.capability_groups.contains(&group)
    }

    /// Comma-separated group list, the form of the IVI Group Capabilities attribute.
    pub fn group_capabilities(&self) -> String {
        self.capability_groups
            .iter()
            .map(CapabilityGroup::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether `model` (e.g. the model field of `*IDN?`) is listed as supported.
    pub fn is_supported_model(&self, model: &str) -> bool {
        self.supported_models
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(model.trim()))
    }
}
