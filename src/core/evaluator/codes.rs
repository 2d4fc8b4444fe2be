//! Fixed clinical vocabulary used by the criteria

/// SNOMED CT: non-small cell lung cancer
pub const SNOMED_NSCLC: &str = "254637007";

/// SNOMED CT: malignant neoplasm of lung
pub const SNOMED_LUNG_CANCER: &str = "424132000";

/// SNOMED CT: secondary malignant neoplasm of brain
pub const SNOMED_BRAIN_METASTASES: &str = "94225005";

pub const LOINC_ECOG: &str = "89247-1";
pub const LOINC_HEMOGLOBIN: &str = "718-7";
pub const LOINC_NEUTROPHILS: &str = "751-8";
pub const LOINC_PLATELETS: &str = "777-3";

/// Condition codes that classify a diagnosis as lung cancer
pub const LUNG_CANCER_CODES: &[&str] = &[SNOMED_NSCLC, SNOMED_LUNG_CANCER];

/// Lower-case phrases that confirm an NSCLC diagnosis
pub const NSCLC_TERMS: &[&str] = &["non-small cell lung cancer", "nsclc"];

pub const CHEMOTHERAPY_AGENTS: &[&str] = &[
    "cisplatin",
    "carboplatin",
    "paclitaxel",
    "docetaxel",
    "gemcitabine",
    "pemetrexed",
    "etoposide",
    "vinorelbine",
    "irinotecan",
    "topotecan",
];

pub const IMMUNOTHERAPY_AGENTS: &[&str] = &[
    "pembrolizumab",
    "nivolumab",
    "atezolizumab",
    "durvalumab",
    "ipilimumab",
    "keytruda",
    "opdivo",
    "tecentriq",
    "imfinzi",
];

pub const TARGETED_AGENTS: &[&str] = &[
    "erlotinib",
    "gefitinib",
    "afatinib",
    "osimertinib",
    "crizotinib",
    "alectinib",
    "ceritinib",
    "brigatinib",
    "tarceva",
    "iressa",
    "tagrisso",
];

pub const GENERIC_THERAPY_TERMS: &[&str] = &["chemotherapy", "immunotherapy", "targeted therapy"];

/// Reason texts that mark a therapy as given for advanced disease
pub const ADVANCED_DISEASE_REASONS: &[&str] = &["metastatic", "advanced", "stage iv", "stage 4"];

pub const BRAIN_METASTASES_TERMS: &[&str] = &[
    "brain metasta",
    "cerebral metasta",
    "brain met",
    "cns metasta",
];

/// Clinical status codes counted as active disease
pub const ACTIVE_STATUS_CODES: &[&str] = &["active", "recurrence", "relapse"];

pub const BRAIN_PROCEDURE_TERMS: &[&str] = &[
    "brain radiation",
    "cranial radiation",
    "whole brain radiation",
    "stereotactic radiosurgery",
    "gamma knife",
    "cyberknife",
    "brain surgery",
    "craniotomy",
    "brain resection",
    "srs",
    "wbrt",
];
