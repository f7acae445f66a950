#![deny(unsafe_code)]

//! Source form kinds.
//!
//! | Form | Name in the export | Writes |
//! |------|--------------------|--------|
//! | Patient | `paciente` | person, visit, observation period, intake observations |
//! | Symptoms | `sintomas` | conditions |
//! | VitalSigns | `signos` | measurements, conditions, observations |
//! | Comorbidity | `comorbilidad` | history observations, measurements |
//! | Sepsis | `sepsis` | focus condition, episode, SOFA measurements |
//! | RiskFactors | `factores_de_riesgo_de_infeccion_por_bacteria_multi` | observations |
//! | PriorInfection | `infecciones_previas` | condition, specimen, culture, organism |
//! | PriorColonization | `colonizaciones_previas` | observation, specimen, culture, organism |
//! | PriorTreatment | `tratamiento_antibiotico_previo` | drug exposure |
//! | EmpiricalTreatment | `tratamiento_empirico` | drug exposure, episode event |
//! | BloodCulture | `hemocultivo_de_urgencias` | specimen, culture, organism, episode events |
//! | OtherCulture | `otros_cultivos_en_urgencias` | specimen, culture, organism, episode events |

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Column holding the subject key in every form export.
pub const SUBJECT_FIELD: &str = "record_id";

/// Separator between a checkbox group name and its option code (`fenotipo_resistencia___3`).
pub const CHECKBOX_SEPARATOR: &str = "___";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormKind {
    Patient,
    Symptoms,
    VitalSigns,
    Comorbidity,
    Sepsis,
    RiskFactors,
    PriorInfection,
    PriorColonization,
    PriorTreatment,
    EmpiricalTreatment,
    BloodCulture,
    OtherCulture,
}

impl FormKind {
    /// All forms in load order. Intake comes first because later forms look
    /// up its visit; sepsis precedes treatments and cultures because they
    /// attach to its episode.
    pub const ALL: [FormKind; 12] = [
        FormKind::Patient,
        FormKind::Symptoms,
        FormKind::VitalSigns,
        FormKind::Comorbidity,
        FormKind::Sepsis,
        FormKind::RiskFactors,
        FormKind::PriorInfection,
        FormKind::PriorColonization,
        FormKind::PriorTreatment,
        FormKind::EmpiricalTreatment,
        FormKind::BloodCulture,
        FormKind::OtherCulture,
    ];

    /// Instrument name used by the capture system and the tracker.
    pub fn name(self) -> &'static str {
        match self {
            FormKind::Patient => "paciente",
            FormKind::Symptoms => "sintomas",
            FormKind::VitalSigns => "signos",
            FormKind::Comorbidity => "comorbilidad",
            FormKind::Sepsis => "sepsis",
            FormKind::RiskFactors => "factores_de_riesgo_de_infeccion_por_bacteria_multi",
            FormKind::PriorInfection => "infecciones_previas",
            FormKind::PriorColonization => "colonizaciones_previas",
            FormKind::PriorTreatment => "tratamiento_antibiotico_previo",
            FormKind::EmpiricalTreatment => "tratamiento_empirico",
            FormKind::BloodCulture => "hemocultivo_de_urgencias",
            FormKind::OtherCulture => "otros_cultivos_en_urgencias",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormKind::Patient => "Patient intake",
            FormKind::Symptoms => "Symptoms",
            FormKind::VitalSigns => "Vital signs",
            FormKind::Comorbidity => "Comorbidities",
            FormKind::Sepsis => "Sepsis and infection focus",
            FormKind::RiskFactors => "Multidrug-resistance risk factors",
            FormKind::PriorInfection => "Previous infections",
            FormKind::PriorColonization => "Previous colonizations",
            FormKind::PriorTreatment => "Previous antimicrobial treatment",
            FormKind::EmpiricalTreatment => "Empirical treatment",
            FormKind::BloodCulture => "Emergency blood culture",
            FormKind::OtherCulture => "Other emergency cultures",
        }
    }

    /// Declared fields, in the order the rules walk them.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            FormKind::Patient => &[
                "fecha_ingreso_urgencias",
                "fecha_nacimiento",
                "sexo",
                "codigo_postal",
                "mujer_gestante",
                "paciente_residencia",
            ],
            FormKind::Symptoms => &["sintoma", "duracion_sintoma"],
            FormKind::VitalSigns => &[
                "temperatura",
                "hipotermia_hipertermia",
                "frec_cardiaca",
                "taquicardia",
                "frec_respiratoria",
                "taquipnea",
                "tension_arterial",
                "hipotension",
                "saturacion_o2",
                "hipoxemia",
            ],
            FormKind::Comorbidity => &[
                "infarto",
                "insuficiencia_cardiaca",
                "evp",
                "e_cerebrovascular",
                "demencia",
                "e_pulmonar_cronica",
                "ulcera_peptica",
                "colagenopatia",
                "hemiplejia",
                "erc",
                "neoplasia",
                "tipo_cancer",
                "linfoma",
                "leucemia",
                "sida",
                "hepatopatia",
                "tipo_hepatopatia",
                "diabetes",
                "indice_de_charlson",
                "inmunosupresion",
                "causa_inmunosupresion",
                "escala_karnofsky",
            ],
            FormKind::Sepsis => &[
                "foco",
                "sepsis",
                "shock_septico",
                "estado_mental_alterado",
                "qsofa",
                "respiracion",
                "snc_glasgow",
                "cardiovascular",
                "bilirrubina",
                "plaquetas",
                "creatinina",
                "sofa",
                "lactato_serico",
                "vasopresores",
            ],
            FormKind::RiskFactors => &[
                "hospit_ano_previo",
                "hospit_mes_previo",
                "hospit_ano_previo_uci",
                "cirugia_previa_sin_implant",
                "cirugia_previa_con_implant",
                "asistencia_sanitaria_prev",
                "hemodialisis_permanente",
                "dialisis_peritoneal",
                "cateter_venoso",
                "sonda_urinaria",
                "sonda_nasogastrica",
                "derivacion_ventriculoper",
                "valvula_prot_cardiaca",
                "portador_otros_disposit",
            ],
            FormKind::PriorInfection => &[
                "fecha_infeccion",
                "sindrome_infeccioso",
                "cultivo_infecciones_previas",
                "microorganism_infec_prev",
                "bmr_infec_previa",
            ],
            FormKind::PriorColonization => &[
                "fecha_colonizacion",
                "cultivo_colonizaciones_previas",
                "microorganismo_colonizador",
                "bmr_colonizador",
            ],
            FormKind::PriorTreatment => &[
                "antimicrobiano_previo",
                "via_administ_antib_prev",
                "fecha_administracion_antib",
                "dias_trat_antimicrobiano",
            ],
            FormKind::EmpiricalTreatment => &["antimicrobiano_empirico"],
            FormKind::BloodCulture => &[
                "id_hemocultivo",
                "fecha_hemocultivo",
                "hemo_positivo_si_no",
                "microorganismo",
                "bmr_etiologia",
            ],
            FormKind::OtherCulture => &[
                "tipo_cultivo",
                "fecha_otros_cultivos",
                "microorganismo_otros_cult",
                "bmr_etiologia_otros",
            ],
        }
    }

    /// Resistance-phenotype checkbox group, exported as `<group>___<option>` columns.
    pub fn checkbox_group(self) -> Option<&'static str> {
        match self {
            FormKind::PriorInfection => Some("feno_resist_infec_prev"),
            FormKind::PriorColonization => Some("fenotipo_resist_colo"),
            FormKind::BloodCulture => Some("fenotipo_resistencia"),
            FormKind::OtherCulture => Some("fenotipo_resistencia_otros"),
            _ => None,
        }
    }

    /// Whether `"0"` is a clinical answer on this form rather than an unset default.
    pub fn zero_is_answer(self) -> bool {
        matches!(
            self,
            FormKind::VitalSigns | FormKind::RiskFactors | FormKind::Comorbidity
        )
    }

    /// Whether a column of an export belongs to this form's declared field set.
    pub fn declares(self, column: &str) -> bool {
        if self.fields().contains(&column) {
            return true;
        }
        match (self.checkbox_group(), column.split_once(CHECKBOX_SEPARATOR)) {
            (Some(group), Some((prefix, option))) => {
                prefix == group && !option.is_empty() && option.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.name() == trimmed)
            .ok_or_else(|| ModelError::UnknownForm(s.to_string()))
    }
}
