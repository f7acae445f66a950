use std::fs;
use std::path::Path;

use cdm_model::{ConceptId, RelationshipKind};
use cdm_standards::{ConceptResolver, MissingMapping, StandardsError, Vocabulary};

fn write_vocabulary(dir: &Path) {
    fs::write(
        dir.join("CONCEPT.csv"),
        "concept_id\tconcept_name\tdomain_id\tvocabulary_id\tconcept_class_id\tstandard_concept\tconcept_code\n\
         4259632\tOrganism\tObservation\tSNOMED\tOrganism\tS\t264395009\n\
         4214811\tCarbapenem resistant organism\tObservation\tSNOMED\tOrganism\tS\t700000000\n\
         4302157\tKlebsiella pneumoniae\tObservation\tSNOMED\tOrganism\tS\t56415008\n\
         1000001\tMalignant neoplasm of breast\tCondition\tICD10CM\t3-char nonbill code\t\tC50\n\
         4112853\tMalignant tumor of breast\tCondition\tSNOMED\tClinical Finding\tS\t254837009\n\
         46233683\tTreated with\tMetadata\tSNOMED\tRelationship\t\tTreated with\n\
         46233684\tTreats\tMetadata\tSNOMED\tRelationship\t\tTreats\n",
    )
    .expect("write concept");
    fs::write(
        dir.join("CONCEPT_RELATIONSHIP.csv"),
        "concept_id_1\tconcept_id_2\trelationship_id\tvalid_start_date\tvalid_end_date\tinvalid_reason\n\
         1000001\t4112853\tMaps to\t20200101\t20991231\t\n\
         1000001\t4259632\tMaps to\t20200101\t20991231\tD\n",
    )
    .expect("write concept relationship");
    fs::write(
        dir.join("CONCEPT_ANCESTOR.csv"),
        "ancestor_concept_id\tdescendant_concept_id\tmin_levels_of_separation\tmax_levels_of_separation\n\
         4214811\t4302157\t1\t1\n\
         4259632\t4214811\t1\t1\n\
         4259632\t4302157\t2\t2\n",
    )
    .expect("write concept ancestor");
    fs::write(
        dir.join("RELATIONSHIP.csv"),
        "relationship_id\trelationship_name\tis_hierarchical\tdefines_ancestry\treverse_relationship_id\trelationship_concept_id\n\
         Has causative agent\tHas causative agent (SNOMED)\t0\t0\tCausative agent of\t44818799\n\
         Causative agent of\tCausative agent of (SNOMED)\t0\t0\tHas causative agent\t44818800\n",
    )
    .expect("write relationship");
}

#[test]
fn loads_athena_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_vocabulary(dir.path());
    let vocabulary = Vocabulary::load_dir(dir.path()).expect("load vocabulary");

    assert_eq!(
        vocabulary.standard_concept("ICD10CM", "C50"),
        Ok(ConceptId::new(4112853))
    );
    assert_eq!(
        vocabulary.standard_concept("SNOMED", "56415008"),
        Ok(ConceptId::new(4302157))
    );
    assert_eq!(
        vocabulary.relationship_concept("Has causative agent (SNOMED)"),
        Ok(ConceptId::new(44818799))
    );
    assert!(vocabulary.has_ancestor(ConceptId::new(4302157), ConceptId::new(4214811)));
    assert!(vocabulary.has_ancestor(ConceptId::new(4302157), ConceptId::new(4259632)));
}

#[test]
fn resolver_answers_relationship_concepts_for_every_kind() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_vocabulary(dir.path());
    let vocabulary = Vocabulary::load_dir(dir.path()).expect("load vocabulary");
    let resolver = ConceptResolver::new(Default::default(), vocabulary, Default::default());

    for kind in RelationshipKind::ALL {
        let forward = resolver.relationship(kind.forward()).expect("forward concept");
        let inverse = resolver.relationship(kind.inverse()).expect("inverse concept");
        assert_ne!(forward, inverse, "{kind}");
    }
}

#[test]
fn unknown_name_is_missing_mapping() {
    let vocabulary = Vocabulary::default();
    assert_eq!(
        vocabulary.concept_by_name("SNOMED", "Treated with"),
        Err(MissingMapping::Named {
            vocabulary: "SNOMED".to_string(),
            name: "Treated with".to_string(),
        })
    );
}

#[test]
fn missing_vocabulary_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = Vocabulary::load_dir(dir.path()).unwrap_err();
    assert!(matches!(error, StandardsError::MissingFile { .. }));
}
