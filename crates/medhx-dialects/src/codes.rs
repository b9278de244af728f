//! Code lists shared by the dialects.

use medhx_codec::code_set;

code_set! {
    /// Patient gender on load and response files.
    pub enum Gender {
        Male => "M",
        Female => "F",
        NonBinary => "N",
        Unknown => "U",
    }
}

code_set! {
    /// Sex assigned at birth on response files.
    pub enum SexAtBirth {
        Male => "M",
        Female => "F",
        Unknown => "U",
        Intersex => "I",
    }
}

code_set! {
    /// Whether the file was produced against the production or test system.
    pub enum Usage {
        Production => "P",
        Test => "T",
    }
}

code_set! {
    /// What the clearinghouse should do with the patients of a load file.
    pub enum FileAction {
        /// Add or update the listed patients.
        Update => "U",
        /// Replace the whole population with the listed patients.
        Refresh => "R",
    }
}

code_set! {
    /// How often a population is reloaded.
    pub enum FileSchedule {
        AdHoc => "ADHOC",
        Daily => "DAILY",
        Weekly => "WEEKLY",
        Monthly => "MONTHLY",
    }
}

code_set! {
    /// Overall outcome of a patient load, reported on the verification header.
    pub enum LoadStatus {
        Loaded => "01",
        LoadedWithErrors => "02",
        Rejected => "03",
    }
}

impl LoadStatus {
    /// Human-readable text paired with the status on the wire.
    pub fn description(self) -> &'static str {
        match self {
            Self::Loaded => "File loaded successfully.",
            Self::LoadedWithErrors => "File loaded with errors.",
            Self::Rejected => "File rejected.",
        }
    }
}

code_set! {
    /// Severity of a verification detail.
    pub enum Severity {
        Warning => "W",
        Error => "E",
        /// The patient row could not be loaded at all.
        Fatal => "F",
    }
}

impl Severity {
    /// Whether the patient was left out of the loaded population.
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

code_set! {
    /// Patient consent flag on response details.
    pub enum Consent {
        Yes => "Y",
    }
}

code_set! {
    /// Controlled-substance schedule of a dispensed drug (NCI thesaurus codes).
    pub enum DeaSchedule {
        ScheduleI => "C48672",
        ScheduleII => "C48675",
        ScheduleIII => "C48676",
        ScheduleIV => "C48677",
        ScheduleV => "C48679",
        Unspecified => "C38046",
    }
}

code_set! {
    /// Position of the paying plan in the patient's coverage.
    pub enum PlanCode {
        Primary => "01",
        Secondary => "02",
        Tertiary => "03",
        Unknown => "99",
    }
}

code_set! {
    /// How a fill was paid for.
    pub enum PaymentCode {
        Cash => "01",
        Medicaid => "02",
        Medicare => "03",
        Commercial => "04",
        MilitaryVa => "05",
        WorkersCompensation => "06",
        IndianNations => "07",
        Other => "99",
    }
}
