//! Rule behavior per form, checked through the rows each one writes.

mod common;

use cdm_model::FormKind;

use common::{
    AMOXICILLIN_CONCEPT, CAUSATIVE_AGENT_OF, COLON_CANCER_CODE, COLON_CANCER_CONCEPT,
    DEFAULT_ANTIMICROBIAL_CONCEPT, ECOLI_CODE, ECOLI_CONCEPT, HAS_CAUSATIVE_AGENT, INTAKE,
    MILD_CONCEPT, MemorySource, SEVERE_CONCEPT, context, count, run, scalar, store, text,
};

const SUBJECT: &str = "HUVR-0100";

fn admitted() -> MemorySource {
    MemorySource::new().with(FormKind::Patient, SUBJECT, &INTAKE)
}

fn with_episode() -> MemorySource {
    admitted().with(FormKind::Sepsis, SUBJECT, &[("sepsis", "1")])
}

#[test]
fn test_patient_writes_person_visit_and_period() {
    let ctx = context();
    let mut conn = store();
    let source = MemorySource::new().with(
        FormKind::Patient,
        SUBJECT,
        &[
            ("fecha_ingreso_urgencias", "2024-03-10"),
            ("fecha_nacimiento", "1950-06-02"),
            ("sexo", "2"),
            ("codigo_postal", "41013"),
            ("mujer_gestante", "0"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(scalar(&conn, "SELECT gender_concept_id FROM person"), 8532);
    assert_eq!(scalar(&conn, "SELECT year_of_birth FROM person"), 1950);
    assert_eq!(
        text(&conn, "SELECT person_source_value FROM person").as_deref(),
        Some(SUBJECT)
    );
    assert_eq!(
        text(&conn, "SELECT observation_period_start_date FROM observation_period").as_deref(),
        Some("1950-06-02")
    );
    assert_eq!(
        text(&conn, "SELECT visit_end_date FROM visit_occurrence").as_deref(),
        Some("2024-03-10")
    );
    // admission, postal code and pregnancy
    assert_eq!(count(&conn, "observation"), 3);
    assert_eq!(
        scalar(
            &conn,
            "SELECT CAST(value_as_number AS INTEGER) FROM observation WHERE observation_concept_id = 4000002"
        ),
        41013
    );
}

#[test]
fn test_patient_without_birth_date_fails() {
    let ctx = context();
    let mut conn = store();
    let source = MemorySource::new().with(
        FormKind::Patient,
        SUBJECT,
        &[("fecha_ingreso_urgencias", "2024-03-10"), ("sexo", "1")],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, "missing field");
    assert_eq!(count(&conn, "person"), 0);
}

#[test]
fn test_symptom_starts_before_admission() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::Symptoms,
        SUBJECT,
        &[("sintoma", "3"), ("duracion_sintoma", "2")],
    );
    run(&mut conn, &ctx, &source);

    assert_eq!(
        text(
            &conn,
            "SELECT condition_start_date FROM condition_occurrence WHERE condition_concept_id = 4000010"
        )
        .as_deref(),
        Some("2024-03-08")
    );
}

#[test]
fn test_vital_signs_derive_missing_flags() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::VitalSigns,
        SUBJECT,
        &[
            ("hipotermia_hipertermia", "2"),
            ("frec_cardiaca", "95"),
            ("saturacion_o2", "97"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    // temperature from the flag, heart rate, saturation
    assert_eq!(count(&conn, "measurement"), 3);
    let temperature = scalar(
        &conn,
        "SELECT COUNT(*) FROM measurement
         WHERE measurement_concept_id = 3020891 AND operator_concept_id = 4172704
           AND value_as_number = 38.0 AND unit_concept_id = 586323",
    );
    assert_eq!(temperature, 1);

    // hyperthermia answered, tachycardia derived
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM condition_occurrence WHERE condition_concept_id IN (4000022, 4000031)"
        ),
        2
    );

    // normal saturation is an observation outside the visit
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000040 AND value_as_concept_id = 4000041
               AND visit_occurrence_id IS NULL AND observation_source_value = 'hipoxemia'"
        ),
        1
    );
}

#[test]
fn test_low_saturation_is_a_condition_on_the_visit() {
    let ctx = context();
    let mut conn = store();
    let source = admitted()
        .with(FormKind::VitalSigns, SUBJECT, &[("saturacion_o2", "93")])
        .with(FormKind::VitalSigns, SUBJECT, &[("saturacion_o2", "95")]);
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(count(&conn, "measurement"), 2);
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM condition_occurrence
             WHERE condition_concept_id = 4000042 AND visit_occurrence_id IS NOT NULL"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000040 AND value_as_concept_id = 4000041
               AND visit_occurrence_id IS NULL"
        ),
        1
    );
    assert_eq!(
        scalar(&conn, "SELECT COUNT(*) FROM observation WHERE observation_concept_id = 4000042"),
        0
    );
}

#[test]
fn test_comorbidities_cover_scores_liver_cancer_and_negatives() {
    let ctx = context();
    let mut conn = store();
    let source = admitted()
        .with(
            FormKind::Comorbidity,
            SUBJECT,
            &[
                ("escala_karnofsky", "70"),
                ("indice_de_charlson", "5"),
                ("hepatopatia", "3"),
                ("tipo_hepatopatia", "2"),
                ("diabetes", "0"),
                ("tipo_cancer", COLON_CANCER_CODE),
            ],
        )
        .with(
            FormKind::Comorbidity,
            SUBJECT,
            &[("hepatopatia", "1"), ("tipo_hepatopatia", "2")],
        );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement
             WHERE measurement_concept_id = 4000100 AND value_as_number = 70.0
               AND unit_concept_id = 4000101 AND measurement_date = '2024-03-10'"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement
             WHERE measurement_concept_id = 4000102 AND value_as_number = 5.0"
        ),
        1
    );

    for qualifier in [SEVERE_CONCEPT, MILD_CONCEPT] {
        assert_eq!(
            scalar(
                &conn,
                &format!(
                    "SELECT COUNT(*) FROM observation
                     WHERE observation_concept_id = 4000106 AND value_as_concept_id = 4000107
                       AND qualifier_concept_id = {qualifier}"
                ),
            ),
            1
        );
    }
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000104 AND value_as_concept_id = 4000105"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000109 AND value_as_concept_id = 4000110"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM observation
                 WHERE observation_concept_id = 4000111
                   AND value_as_concept_id = {COLON_CANCER_CONCEPT}"
            ),
        ),
        1
    );
    // history facts stay outside the visit
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement WHERE visit_occurrence_id IS NOT NULL"
        ),
        0
    );
}

#[test]
fn test_risk_factors_are_observations_at_admission() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::RiskFactors,
        SUBJECT,
        &[("sonda_urinaria", "1"), ("cateter_venoso", "0")],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_date = '2024-03-10' AND visit_occurrence_id IS NULL
               AND ((observation_concept_id = 4000120 AND value_as_concept_id = 4000121)
                 OR (observation_concept_id = 4000122 AND value_as_concept_id = 4000123))"
        ),
        2
    );
}

#[test]
fn test_vital_signs_need_admission() {
    let ctx = context();
    let mut conn = store();
    let source = MemorySource::new().with(FormKind::VitalSigns, SUBJECT, &[("frec_cardiaca", "80")]);
    let summary = run(&mut conn, &ctx, &source);
    assert_eq!(summary.failures[0].kind, "missing precondition");
    assert_eq!(count(&conn, "measurement"), 0);
}

#[test]
fn test_prior_infection_chain_and_links() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::PriorInfection,
        SUBJECT,
        &[
            ("sindrome_infeccioso", "2"),
            ("microorganism_infec_prev", ECOLI_CODE),
            ("bmr_infec_previa", "1"),
            ("feno_resist_infec_prev___1", "1"),
            ("feno_resist_infec_prev___2", "1"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        text(
            &conn,
            "SELECT condition_start_date FROM condition_occurrence WHERE condition_concept_id = 4000081"
        )
        .as_deref(),
        Some("2023-03-11")
    );
    assert_eq!(count(&conn, "specimen"), 1);

    let organism_visit = scalar(
        &conn,
        &format!(
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = {ECOLI_CONCEPT} AND visit_occurrence_id IS NULL
               AND obs_event_field_concept_id IS NOT NULL"
        ),
    );
    assert_eq!(organism_visit, 1);

    // option 1 on an Enterobacterales organism is the ESBL phenotype
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement WHERE measurement_concept_id IN (3009403, 4000087)"
        ),
        2
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement WHERE measurement_concept_id = 4000086"
        ),
        0
    );

    assert_eq!(count(&conn, "fact_relationship"), 2);
    for concept in [HAS_CAUSATIVE_AGENT, CAUSATIVE_AGENT_OF] {
        assert_eq!(
            scalar(
                &conn,
                &format!(
                    "SELECT COUNT(*) FROM fact_relationship WHERE relationship_concept_id = {concept}"
                )
            ),
            1
        );
    }
}

#[test]
fn test_prior_infection_unknown_organism_fails() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::PriorInfection,
        SUBJECT,
        &[("sindrome_infeccioso", "2"), ("microorganism_infec_prev", "999999")],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, "missing mapping");
    assert_eq!(
        summary.failures[0].redacted_message,
        "no mapping for SNOMED standard concept"
    );
    assert_eq!(count(&conn, "specimen"), 0);
    assert_eq!(count(&conn, "condition_occurrence"), 0);
}

#[test]
fn test_prior_infection_without_organism_uses_default() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::PriorInfection,
        SUBJECT,
        &[("sindrome_infeccioso", "2"), ("fecha_infeccion", "2023-11-02")],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    let default_organism = ctx.settings.defaults.organism.get();
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM observation
                 WHERE observation_concept_id = {default_organism}
                   AND observation_date = '2023-11-02'"
            ),
        ),
        1
    );
    assert_eq!(count(&conn, "fact_relationship"), 2);
}

#[test]
fn test_prior_colonization_links_two_observations() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::PriorColonization,
        SUBJECT,
        &[
            ("fecha_colonizacion", "2023-09-01"),
            ("microorganismo_colonizador", ECOLI_CODE),
            ("bmr_colonizador", "1"),
            ("fenotipo_resist_colo___3", "1"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM specimen
             WHERE specimen_concept_id = 4000131 AND specimen_date = '2023-09-01'"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT value_as_concept_id FROM measurement WHERE measurement_concept_id = 4000132"
        ),
        4_000_133
    );
    // carrier, organism and resistance, none on the visit
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM observation
                 WHERE observation_date = '2023-09-01' AND visit_occurrence_id IS NULL
                   AND observation_concept_id IN (4000130, {ECOLI_CONCEPT}, 4000134)"
            ),
        ),
        3
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement WHERE measurement_concept_id = 4000135"
        ),
        1
    );

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM fact_relationship
             WHERE domain_concept_id_1 = 27 AND domain_concept_id_2 = 27"
        ),
        2
    );
    let carrier = scalar(
        &conn,
        "SELECT observation_id FROM observation WHERE observation_concept_id = 4000130",
    );
    let organism = scalar(
        &conn,
        &format!(
            "SELECT observation_id FROM observation WHERE observation_concept_id = {ECOLI_CONCEPT}"
        ),
    );
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM fact_relationship
                 WHERE fact_id_1 = {carrier} AND fact_id_2 = {organism}
                   AND relationship_concept_id = {HAS_CAUSATIVE_AGENT}"
            ),
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM fact_relationship
                 WHERE fact_id_1 = {organism} AND fact_id_2 = {carrier}
                   AND relationship_concept_id = {CAUSATIVE_AGENT_OF}"
            ),
        ),
        1
    );
}

#[test]
fn test_prior_treatment_defaults() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::PriorTreatment,
        SUBJECT,
        &[("antimicrobiano_previo", "J99XX99"), ("dias_trat_antimicrobiano", "5")],
    );
    run(&mut conn, &ctx, &source);

    assert_eq!(
        scalar(&conn, "SELECT drug_concept_id FROM drug_exposure"),
        DEFAULT_ANTIMICROBIAL_CONCEPT
    );
    assert_eq!(
        text(&conn, "SELECT drug_exposure_start_date FROM drug_exposure").as_deref(),
        Some("2023-12-11")
    );
    assert_eq!(
        text(&conn, "SELECT drug_exposure_end_date FROM drug_exposure").as_deref(),
        Some("2023-12-15")
    );
    assert_eq!(
        text(&conn, "SELECT drug_source_value FROM drug_exposure").as_deref(),
        Some("J99XX99")
    );
    assert_eq!(
        scalar(&conn, "SELECT COUNT(*) FROM drug_exposure WHERE visit_occurrence_id IS NULL"),
        1
    );
}

#[test]
fn test_empirical_treatment_translates_atc() {
    let ctx = context();
    let mut conn = store();
    let source = with_episode().with(
        FormKind::EmpiricalTreatment,
        SUBJECT,
        &[("antimicrobiano_empirico", "J01CR02")],
    );
    run(&mut conn, &ctx, &source);
    assert_eq!(
        scalar(&conn, "SELECT drug_concept_id FROM drug_exposure"),
        AMOXICILLIN_CONCEPT
    );
}

#[test]
fn test_positive_blood_culture_joins_episode() {
    let ctx = context();
    let mut conn = store();
    let source = with_episode().with(
        FormKind::BloodCulture,
        SUBJECT,
        &[
            ("id_hemocultivo", "HC-1"),
            ("hemo_positivo_si_no", "1"),
            ("microorganismo", ECOLI_CODE),
            ("bmr_etiologia", "1"),
            ("fenotipo_resistencia___2", "1"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        text(&conn, "SELECT specimen_date FROM specimen").as_deref(),
        Some("2024-03-10")
    );
    assert_eq!(count(&conn, "culture_origin"), 1);
    // focus, then specimen, culture, organism, resistance and phenotype
    assert_eq!(count(&conn, "episode_event"), 6);
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement WHERE measurement_concept_id = 4000095"
        ),
        1
    );
}

#[test]
fn test_negative_blood_culture_stops_at_result() {
    let ctx = context();
    let mut conn = store();
    let source = with_episode().with(
        FormKind::BloodCulture,
        SUBJECT,
        &[("hemo_positivo_si_no", "0"), ("fecha_hemocultivo", "2024-03-11")],
    );
    run(&mut conn, &ctx, &source);

    assert_eq!(
        scalar(
            &conn,
            "SELECT value_as_concept_id FROM measurement WHERE measurement_concept_id = 4000091"
        ),
        4_000_093
    );
    assert_eq!(
        text(&conn, "SELECT specimen_date FROM specimen").as_deref(),
        Some("2024-03-11")
    );
    assert_eq!(count(&conn, "culture_origin"), 0);
    // intake observations only
    assert_eq!(count(&conn, "observation"), 2);
}

#[test]
fn test_other_culture_joins_episode() {
    let ctx = context();
    let mut conn = store();
    let source = with_episode().with(
        FormKind::OtherCulture,
        SUBJECT,
        &[
            ("tipo_cultivo", "4"),
            ("fecha_otros_cultivos", "2024-03-12"),
            ("microorganismo_otros_cult", ECOLI_CODE),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM specimen
             WHERE specimen_concept_id = 4000140 AND specimen_date = '2024-03-12'"
        ),
        1
    );
    let culture = scalar(
        &conn,
        "SELECT measurement_id FROM measurement
         WHERE measurement_concept_id = 4000141 AND value_as_concept_id = 4000142
           AND visit_occurrence_id IS NOT NULL",
    );
    assert_eq!(
        scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM observation
                 WHERE observation_concept_id = {ECOLI_CONCEPT} AND observation_event_id = {culture}
                   AND visit_occurrence_id IS NOT NULL"
            ),
        ),
        1
    );
    // focus, then specimen, culture and organism
    assert_eq!(count(&conn, "episode_event"), 4);
}

#[test]
fn test_sepsis_writes_shock_lactate_and_vasopressors() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::Sepsis,
        SUBJECT,
        &[
            ("foco", "3"),
            ("sepsis", "1"),
            ("shock_septico", "0"),
            ("lactato_serico", "2"),
            ("vasopresores", "1"),
        ],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM procedure_occurrence
             WHERE procedure_concept_id = 4000062 AND visit_occurrence_id IS NOT NULL"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000052 AND value_as_concept_id = 4000053"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM condition_occurrence WHERE condition_concept_id = 4000052"
        ),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM measurement
             WHERE measurement_concept_id = 4000065 AND operator_concept_id = 4172704
               AND value_as_number = 4.0 AND unit_concept_id = 8753"
        ),
        1
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM condition_occurrence WHERE condition_concept_id = 132797"
        ),
        1
    );
}

#[test]
fn test_sepsis_without_vasopressors_is_an_observation() {
    let ctx = context();
    let mut conn = store();
    let source = admitted().with(
        FormKind::Sepsis,
        SUBJECT,
        &[("foco", "3"), ("vasopresores", "0")],
    );
    let summary = run(&mut conn, &ctx, &source);
    assert!(!summary.has_failures(), "{:?}", summary.failures);

    assert_eq!(count(&conn, "procedure_occurrence"), 0);
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM observation
             WHERE observation_concept_id = 4000063 AND value_as_concept_id = 4000064"
        ),
        1
    );
}
