//! Known resource type names.
//!
//! Lookup is case-insensitive and returns the canonical casing. The table is
//! a compile-time perfect hash map keyed by the lower-cased name.

use phf::phf_map;

static RESOURCE_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "account" => "Account",
    "activitydefinition" => "ActivityDefinition",
    "adverseevent" => "AdverseEvent",
    "allergyintolerance" => "AllergyIntolerance",
    "appointment" => "Appointment",
    "appointmentresponse" => "AppointmentResponse",
    "auditevent" => "AuditEvent",
    "basic" => "Basic",
    "binary" => "Binary",
    "biologicallyderivedproduct" => "BiologicallyDerivedProduct",
    "bodystructure" => "BodyStructure",
    "bundle" => "Bundle",
    "capabilitystatement" => "CapabilityStatement",
    "careplan" => "CarePlan",
    "careteam" => "CareTeam",
    "catalogentry" => "CatalogEntry",
    "chargeitem" => "ChargeItem",
    "chargeitemdefinition" => "ChargeItemDefinition",
    "claim" => "Claim",
    "claimresponse" => "ClaimResponse",
    "clinicalimpression" => "ClinicalImpression",
    "codesystem" => "CodeSystem",
    "communication" => "Communication",
    "communicationrequest" => "CommunicationRequest",
    "compartmentdefinition" => "CompartmentDefinition",
    "composition" => "Composition",
    "conceptmap" => "ConceptMap",
    "condition" => "Condition",
    "consent" => "Consent",
    "contract" => "Contract",
    "coverage" => "Coverage",
    "coverageeligibilityrequest" => "CoverageEligibilityRequest",
    "coverageeligibilityresponse" => "CoverageEligibilityResponse",
    "detectedissue" => "DetectedIssue",
    "device" => "Device",
    "devicedefinition" => "DeviceDefinition",
    "devicemetric" => "DeviceMetric",
    "devicerequest" => "DeviceRequest",
    "deviceusestatement" => "DeviceUseStatement",
    "diagnosticreport" => "DiagnosticReport",
    "documentmanifest" => "DocumentManifest",
    "documentreference" => "DocumentReference",
    "effectevidencesynthesis" => "EffectEvidenceSynthesis",
    "encounter" => "Encounter",
    "endpoint" => "Endpoint",
    "enrollmentrequest" => "EnrollmentRequest",
    "enrollmentresponse" => "EnrollmentResponse",
    "episodeofcare" => "EpisodeOfCare",
    "eventdefinition" => "EventDefinition",
    "evidence" => "Evidence",
    "evidencevariable" => "EvidenceVariable",
    "examplescenario" => "ExampleScenario",
    "explanationofbenefit" => "ExplanationOfBenefit",
    "familymemberhistory" => "FamilyMemberHistory",
    "flag" => "Flag",
    "goal" => "Goal",
    "graphdefinition" => "GraphDefinition",
    "group" => "Group",
    "guidanceresponse" => "GuidanceResponse",
    "healthcareservice" => "HealthcareService",
    "imagingstudy" => "ImagingStudy",
    "immunization" => "Immunization",
    "immunizationevaluation" => "ImmunizationEvaluation",
    "immunizationrecommendation" => "ImmunizationRecommendation",
    "implementationguide" => "ImplementationGuide",
    "insuranceplan" => "InsurancePlan",
    "invoice" => "Invoice",
    "library" => "Library",
    "linkage" => "Linkage",
    "list" => "List",
    "location" => "Location",
    "measure" => "Measure",
    "measurereport" => "MeasureReport",
    "media" => "Media",
    "medication" => "Medication",
    "medicationadministration" => "MedicationAdministration",
    "medicationdispense" => "MedicationDispense",
    "medicationknowledge" => "MedicationKnowledge",
    "medicationrequest" => "MedicationRequest",
    "medicationstatement" => "MedicationStatement",
    "medicinalproduct" => "MedicinalProduct",
    "medicinalproductauthorization" => "MedicinalProductAuthorization",
    "medicinalproductcontraindication" => "MedicinalProductContraindication",
    "medicinalproductindication" => "MedicinalProductIndication",
    "medicinalproductingredient" => "MedicinalProductIngredient",
    "medicinalproductinteraction" => "MedicinalProductInteraction",
    "medicinalproductmanufactured" => "MedicinalProductManufactured",
    "medicinalproductpackaged" => "MedicinalProductPackaged",
    "medicinalproductpharmaceutical" => "MedicinalProductPharmaceutical",
    "medicinalproductundesirableeffect" => "MedicinalProductUndesirableEffect",
    "messagedefinition" => "MessageDefinition",
    "messageheader" => "MessageHeader",
    "molecularsequence" => "MolecularSequence",
    "namingsystem" => "NamingSystem",
    "nutritionorder" => "NutritionOrder",
    "observation" => "Observation",
    "observationdefinition" => "ObservationDefinition",
    "operationdefinition" => "OperationDefinition",
    "operationoutcome" => "OperationOutcome",
    "organization" => "Organization",
    "organizationaffiliation" => "OrganizationAffiliation",
    "parameters" => "Parameters",
    "patient" => "Patient",
    "paymentnotice" => "PaymentNotice",
    "paymentreconciliation" => "PaymentReconciliation",
    "person" => "Person",
    "plandefinition" => "PlanDefinition",
    "practitioner" => "Practitioner",
    "practitionerrole" => "PractitionerRole",
    "procedure" => "Procedure",
    "provenance" => "Provenance",
    "questionnaire" => "Questionnaire",
    "questionnaireresponse" => "QuestionnaireResponse",
    "relatedperson" => "RelatedPerson",
    "requestgroup" => "RequestGroup",
    "researchdefinition" => "ResearchDefinition",
    "researchelementdefinition" => "ResearchElementDefinition",
    "researchstudy" => "ResearchStudy",
    "researchsubject" => "ResearchSubject",
    "riskassessment" => "RiskAssessment",
    "riskevidencesynthesis" => "RiskEvidenceSynthesis",
    "schedule" => "Schedule",
    "searchparameter" => "SearchParameter",
    "servicerequest" => "ServiceRequest",
    "slot" => "Slot",
    "specimen" => "Specimen",
    "specimendefinition" => "SpecimenDefinition",
    "structuredefinition" => "StructureDefinition",
    "structuremap" => "StructureMap",
    "subscription" => "Subscription",
    "substance" => "Substance",
    "substancenucleicacid" => "SubstanceNucleicAcid",
    "substancepolymer" => "SubstancePolymer",
    "substanceprotein" => "SubstanceProtein",
    "substancereferenceinformation" => "SubstanceReferenceInformation",
    "substancesourcematerial" => "SubstanceSourceMaterial",
    "substancespecification" => "SubstanceSpecification",
    "supplydelivery" => "SupplyDelivery",
    "supplyrequest" => "SupplyRequest",
    "task" => "Task",
    "terminologycapabilities" => "TerminologyCapabilities",
    "testreport" => "TestReport",
    "testscript" => "TestScript",
    "valueset" => "ValueSet",
    "verificationresult" => "VerificationResult",
    "visionprescription" => "VisionPrescription",
};

/// Types that cannot hold contained resources.
const NOT_CONTAINER_CAPABLE: [&str; 3] = ["Bundle", "Binary", "Parameters"];

/// Canonical casing of a known resource type, matched case-insensitively.
pub fn canonical_resource_type(name: &str) -> Option<&'static str> {
    if name.is_empty() || name.len() > 64 {
        return None;
    }
    RESOURCE_TYPES.get(name.to_ascii_lowercase().as_str()).copied()
}

/// True if `name` is a known resource type (any casing).
pub fn is_known_resource_type(name: &str) -> bool {
    canonical_resource_type(name).is_some()
}

/// True if resources of this type may carry a `contained` list.
pub fn is_container_capable(name: &str) -> bool {
    match canonical_resource_type(name) {
        Some(canonical) => !NOT_CONTAINER_CAPABLE.contains(&canonical),
        None => false,
    }
}

/// Number of known resource types.
pub fn resource_type_count() -> usize {
    RESOURCE_TYPES.len()
}
