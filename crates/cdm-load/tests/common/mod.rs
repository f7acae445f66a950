//! Shared fixture: a small concept table and vocabulary covering the
//! scenarios, and an in-memory record source.

#![allow(dead_code)]

use cdm_ingest::{RecordSource, SubjectGroup, group_by_subject};
use cdm_load::{LoadContext, LoadSummary, Loader, NoopObserver};
use cdm_model::{ConceptId, FormKind, SourceRecord, SubjectId};
use cdm_standards::{
    Branch, ConceptEntry, ConceptResolver, ConceptTable, DrugCodeTranslator, MappingKey,
    NONE_VALUE, Vocabulary,
};
use cdm_store::{Connection, open_memory_store};
use chrono::NaiveDate;

pub const ADMISSION_CONCEPT: i64 = 4_000_001;
pub const DEFAULT_FOCUS_CONCEPT: i64 = 4_000_050;
pub const ECOLI_CONCEPT: i64 = 4_011_683;
pub const ECOLI_CODE: &str = "112283007";
pub const DEFAULT_ANTIMICROBIAL_CONCEPT: i64 = 4_000_070;
pub const AMOXICILLIN_CONCEPT: i64 = 1_713_332;

pub const MILD_CONCEPT: i64 = 4_116_992;
pub const SEVERE_CONCEPT: i64 = 4_087_703;
pub const COLON_CANCER_CODE: &str = "C18.9";
pub const COLON_CANCER_CONCEPT: i64 = 4_180_790;

pub const TREATED_WITH: i64 = 46_233_683;
pub const TREATS: i64 = 46_233_684;
pub const HAS_CAUSATIVE_AGENT: i64 = 44_818_799;
pub const CAUSATIVE_AGENT_OF: i64 = 44_818_800;

fn concept(variable: &str, branch: Branch, value: &str, id: i64) -> (MappingKey, ConceptEntry) {
    (
        MappingKey::new(variable, branch, value),
        ConceptEntry {
            concept_id: Some(ConceptId::new(id)),
            concept_code: None,
        },
    )
}

fn code(variable: &str, value: &str, code: &str) -> (MappingKey, ConceptEntry) {
    (
        MappingKey::new(variable, Branch::Value, value),
        ConceptEntry {
            concept_id: None,
            concept_code: Some(code.to_string()),
        },
    )
}

pub fn concept_table() -> ConceptTable {
    use Branch::{Operator, Semantic, Units, Value};
    ConceptTable::from_entries([
        // paciente
        concept("fecha_ingreso_urgencias", Semantic, NONE_VALUE, ADMISSION_CONCEPT),
        concept("sexo", Semantic, "1", 8507),
        concept("sexo", Semantic, "2", 8532),
        concept("codigo_postal", Semantic, NONE_VALUE, 4_000_002),
        concept("paciente_residencia", Semantic, NONE_VALUE, 4_000_003),
        concept("paciente_residencia", Value, "1", 4_000_004),
        concept("mujer_gestante", Semantic, NONE_VALUE, 4_000_005),
        concept("mujer_gestante", Value, "0", 4_000_006),
        // sintomas
        concept("sintoma", Semantic, "3", 4_000_010),
        // signos
        concept("temperatura", Semantic, NONE_VALUE, 3_020_891),
        concept("temperatura", Units, NONE_VALUE, 586_323),
        concept("hipotermia_hipertermia", Semantic, "0", 4_000_020),
        concept("hipotermia_hipertermia", Semantic, "1", 4_000_021),
        concept("hipotermia_hipertermia", Semantic, "2", 4_000_022),
        concept("hipotermia_hipertermia", Operator, "2", 4_172_704),
        concept("hipotermia_hipertermia", Units, "2", 586_323),
        code("hipotermia_hipertermia", "2", "38"),
        concept("frec_cardiaca", Semantic, NONE_VALUE, 3_027_018),
        concept("frec_cardiaca", Units, NONE_VALUE, 8541),
        concept("taquicardia", Semantic, "0", 4_000_030),
        concept("taquicardia", Semantic, "1", 4_000_031),
        concept("saturacion_o2", Semantic, NONE_VALUE, 40_762_499),
        concept("saturacion_o2", Units, NONE_VALUE, 8554),
        concept("hipoxemia", Semantic, "0", 4_000_040),
        concept("hipoxemia", Value, "0", 4_000_041),
        concept("hipoxemia", Semantic, "1", 4_000_042),
        // comorbilidad
        concept("escala_karnofsky", Semantic, NONE_VALUE, 4_000_100),
        concept("escala_karnofsky", Units, NONE_VALUE, 4_000_101),
        concept("indice_de_charlson", Semantic, NONE_VALUE, 4_000_102),
        concept("indice_de_charlson", Units, NONE_VALUE, 4_000_103),
        concept("hepatopatia", Semantic, "1", 4_000_112),
        concept("hepatopatia", Value, "1", 4_000_113),
        concept("hepatopatia", Semantic, "3", 4_000_104),
        concept("hepatopatia", Value, "3", 4_000_105),
        concept("tipo_hepatopatia", Semantic, NONE_VALUE, 4_000_106),
        concept("tipo_hepatopatia", Value, "2", 4_000_107),
        concept("diabetes", Semantic, "0", 4_000_109),
        concept("diabetes", Value, "0", 4_000_110),
        concept("tipo_cancer", Semantic, NONE_VALUE, 4_000_111),
        // sepsis
        concept("foco", Semantic, "12", DEFAULT_FOCUS_CONCEPT),
        concept("foco", Semantic, "3", 4_000_051),
        concept("sepsis", Semantic, "1", 132_797),
        concept("shock_septico", Semantic, "0", 4_000_052),
        concept("shock_septico", Value, "0", 4_000_053),
        concept("sofa", Semantic, NONE_VALUE, 4_000_060),
        concept("sofa", Units, NONE_VALUE, 4_000_061),
        concept("vasopresores", Semantic, "1", 4_000_062),
        concept("vasopresores", Semantic, "0", 4_000_063),
        concept("vasopresores", Value, "0", 4_000_064),
        concept("lactato_serico", Semantic, "2", 4_000_065),
        concept("lactato_serico", Operator, "2", 4_172_704),
        concept("lactato_serico", Units, "2", 8753),
        code("lactato_serico", "2", "4"),
        // factores_de_riesgo_de_infeccion_por_bacteria_multi
        concept("sonda_urinaria", Semantic, "1", 4_000_120),
        concept("sonda_urinaria", Value, "1", 4_000_121),
        concept("cateter_venoso", Semantic, "0", 4_000_122),
        concept("cateter_venoso", Value, "0", 4_000_123),
        // infecciones_previas
        concept("sindrome_infeccioso", Semantic, "13", 4_000_080),
        concept("sindrome_infeccioso", Semantic, "2", 4_000_081),
        concept("especimen_infecciones_previas", Semantic, NONE_VALUE, 4_000_082),
        concept("cultivo_infecciones_previas", Semantic, NONE_VALUE, 4_000_083),
        concept("cultivo_infecciones_previas", Value, NONE_VALUE, 4_000_084),
        concept("bmr_infec_previa", Semantic, "1", 4_000_085),
        concept("feno_resist_infec_prev", Semantic, "1", 4_000_086),
        concept("feno_resist_infec_prev", Semantic, "2", 4_000_087),
        concept("feno_resist_infec_prev", Value, "1", 4_000_088),
        concept("feno_resist_infec_prev", Value, "2", 4_000_089),
        // colonizaciones_previas
        concept("portador_agente_infeccioso", Semantic, NONE_VALUE, 4_000_130),
        concept("especimen_coloniza_previas", Semantic, NONE_VALUE, 4_000_131),
        concept("cultivo_colonizaciones_previas", Semantic, NONE_VALUE, 4_000_132),
        concept("cultivo_colonizaciones_previas", Value, NONE_VALUE, 4_000_133),
        concept("bmr_colonizador", Semantic, "1", 4_000_134),
        concept("fenotipo_resist_colo", Semantic, "3", 4_000_135),
        concept("fenotipo_resist_colo", Value, "3", 4_000_136),
        // otros_cultivos_en_urgencias
        concept("especimen_otros_cultivos_urg", Semantic, "4", 4_000_140),
        concept("tipo_cultivo", Semantic, "4", 4_000_141),
        concept("tipo_cultivo", Value, NONE_VALUE, 4_000_142),
        // hemocultivo_de_urgencias
        concept("especimen_hemocultivo_urg", Semantic, NONE_VALUE, 4_000_090),
        concept("hemo_positivo_si_no", Semantic, NONE_VALUE, 4_000_091),
        concept("hemo_positivo_si_no", Value, "1", 4_000_092),
        concept("hemo_positivo_si_no", Value, "0", 4_000_093),
        concept("bmr_etiologia", Semantic, "1", 4_000_094),
        concept("fenotipo_resistencia", Semantic, "2", 4_000_095),
        concept("fenotipo_resistencia", Value, "2", 4_000_096),
    ])
}

pub fn vocabulary() -> Vocabulary {
    let mut vocabulary = Vocabulary::default();
    vocabulary.add_concept(ConceptId::new(TREATED_WITH), "SNOMED", "47429007", "Treated with", true);
    vocabulary.add_concept(ConceptId::new(TREATS), "SNOMED", "47429008", "Treats", true);
    vocabulary.add_relationship("Has causative agent (SNOMED)", ConceptId::new(HAS_CAUSATIVE_AGENT));
    vocabulary.add_relationship("Causative agent of (SNOMED)", ConceptId::new(CAUSATIVE_AGENT_OF));
    vocabulary.add_concept(
        ConceptId::new(ECOLI_CONCEPT),
        "SNOMED",
        ECOLI_CODE,
        "Escherichia coli",
        true,
    );
    vocabulary.add_concept(
        ConceptId::new(DEFAULT_ANTIMICROBIAL_CONCEPT),
        "SNOMED",
        "895275007",
        "Antimicrobial",
        true,
    );
    vocabulary.add_concept(ConceptId::new(MILD_CONCEPT), "SNOMED", "255604002", "Mild", true);
    vocabulary.add_concept(ConceptId::new(SEVERE_CONCEPT), "SNOMED", "371924009", "Severe", true);
    vocabulary.add_concept(
        ConceptId::new(45_000_001),
        "ICD10CM",
        COLON_CANCER_CODE,
        "Malignant neoplasm of colon, unspecified",
        false,
    );
    vocabulary.add_concept(
        ConceptId::new(COLON_CANCER_CONCEPT),
        "SNOMED",
        "363406005",
        "Malignant neoplasm of colon",
        true,
    );
    vocabulary.add_maps_to(ConceptId::new(45_000_001), ConceptId::new(COLON_CANCER_CONCEPT));
    // E. coli -> Escherichia -> Enterobacteriaceae lineage
    vocabulary.add_parent(ConceptId::new(ECOLI_CONCEPT), ConceptId::new(4_000_500));
    vocabulary.add_parent(ConceptId::new(4_000_500), ConceptId::new(4_214_811));
    vocabulary
}

pub fn context() -> LoadContext {
    let mut drugs = DrugCodeTranslator::default();
    drugs.insert("J01CR02", ConceptId::new(AMOXICILLIN_CONCEPT));
    LoadContext::new(ConceptResolver::new(concept_table(), vocabulary(), drugs))
}

/// Records held in memory, grouped per form on request.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Vec<SourceRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, form: FormKind, subject: &str, cells: &[(&str, &str)]) -> Self {
        self.records.push(record(form, subject, cells));
        self
    }
}

impl RecordSource for MemorySource {
    fn groups(&self, form: FormKind) -> anyhow::Result<Vec<SubjectGroup>> {
        Ok(group_by_subject(
            self.records
                .iter()
                .filter(|record| record.form == form)
                .cloned()
                .collect(),
        ))
    }
}

pub fn record(form: FormKind, subject: &str, cells: &[(&str, &str)]) -> SourceRecord {
    SourceRecord::new(
        form,
        SubjectId::new(subject).expect("subject"),
        cells.iter().copied(),
    )
}

pub fn load_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 1).expect("date")
}

pub fn store() -> Connection {
    open_memory_store().expect("memory store")
}

pub fn run(conn: &mut Connection, ctx: &LoadContext, source: &MemorySource) -> LoadSummary {
    Loader::new(ctx)
        .with_processed_date(load_day())
        .run(conn, source, &mut NoopObserver)
        .expect("load run")
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    cdm_store::queries::count_rows(conn, table).expect("count rows")
}

pub fn scalar(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).expect("scalar query")
}

pub fn text(conn: &Connection, sql: &str) -> Option<String> {
    conn.query_row(sql, [], |row| row.get(0)).expect("text query")
}

/// Intake answers for an admission on 2024-03-10.
pub const INTAKE: [(&str, &str); 4] = [
    ("fecha_ingreso_urgencias", "2024-03-10"),
    ("fecha_nacimiento", "1950-06-02"),
    ("sexo", "1"),
    ("paciente_residencia", "1"),
];
