//! Record declarations of the clinic application.
//!
//! Column names follow the forms the clinic staff use. `lb_*` fields are
//! section headers for the patient form; they are ignored by the storage
//! layer. [`FollowUp`] and [`ManagementPlan`] are both tables of their own
//! and the element types of the patient's `ls_sg` / `ls_pm` list fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordType};

crate::record! {
    /// Follow-up appointment notes.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct FollowUp {
        pub fecha_proximo_control: Option<NaiveDate> =>
            optional_date().title("Fecha Prox. Control"),
        pub observaciones_adicionales: Option<String> =>
            optional_text().control(crate::InputWidget::InputTextRich).title("Observaciones"),
    }
}

crate::record! {
    /// Clinical management plan.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ManagementPlan {
        pub paraclinicos: Option<String> => optional_text().title("Paraclínicos"),
        pub medicamentos: Option<String> => optional_text().title("Medicamentos"),
        pub recomendaciones: Option<String> => optional_text().title("Recomendaciones"),
        pub remisiones: Option<String> => optional_text().title("Remisiones"),
    }
}

crate::record! {
    /// A general medical consultation. Has no declared key, so deletes
    /// match on every filled-in field.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct MedicalConsultation {
        pub motivo_consulta: Option<String> =>
            optional_text().title("Motivo de Consulta").required(),
        pub historia_enfermedad_actual: Option<String> => optional_text().title("Historial"),
        pub examen_fisico: Option<String> => optional_text().title("Examen Fisico"),
        pub diagnostico: Option<String> => optional_text().title("Diagnostico"),
        pub plan_manejo: Option<String> => optional_text().title("Plan de Manejo"),
        pub seguimiento_fecha: Option<NaiveDate> => optional_date().title("Fecha"),
        pub seguimiento_observaciones: Option<String> => optional_text().title("Observaciones"),
    }
}

crate::record! {
    /// General patient information: identity, history, physical exam and
    /// the attending professional.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Patient {
        pub id: i64 => integer()
            .primary_key()
            .autoincrement()
            .unique()
            .control(crate::InputWidget::None)
            .title("Codigo")
            .readonly()
            .hidden_in_table(),
        pub lb_g: i64 => separator().title("Informacion General"),
        pub nombre_completo: Option<String> =>
            optional_text().required().title("Nombre Completo").searchable(),
        pub fecha_nacimiento: Option<NaiveDate> => optional_date()
            .required()
            .title("Fecha de Nacimiento")
            .hidden_in_table()
            .searchable(),
        pub edad: Option<i64> => optional_integer().required().title("Edad").searchable(),
        pub genero: Option<String> => optional_text()
            .items(&["Masculino", "Femenino"])
            .required()
            .title("Genero")
            .searchable(),
        pub cedula: Option<String> => optional_text().required().title("Cedula").searchable(),
        pub direccion: Option<String> => optional_text().title("Direccion").hidden_in_table(),
        pub telefono: Option<String> => optional_text().title("Telefono"),
        pub email: Option<String> => optional_text().title("Email").hidden_in_table(),
        pub estado_civil: Option<String> => optional_text()
            .items(&["Soltero", "Casado", "Divorciado", "Viudo", "Otro"])
            .title("Estado Civil")
            .hidden_in_table(),
        pub ocupacion: Option<String> => optional_text().title("Ocupacion").hidden_in_table(),

        pub lb_ap: i64 => separator().title("Antecedentes Personales"),
        pub patologicos: Option<String> => optional_text().title("Patológicos").hidden_in_table(),
        pub quirurgicos: Option<String> => optional_text().title("Quirúrgicos").hidden_in_table(),
        pub alergicos: Option<String> => optional_text().title("Alergicos").hidden_in_table(),
        pub traumaticos: Option<String> => optional_text().title("Traumáticos").hidden_in_table(),
        pub toxicos: Option<String> => optional_text().title("Tóxicos").hidden_in_table(),
        pub gineco_obstetricos: Option<String> =>
            optional_text().title("Gineco-obstétricos").hidden_in_table(),
        pub psiquiatricos: Option<String> =>
            optional_text().title("Psiquiátricos").hidden_in_table(),
        pub hospitalizaciones_previas: Option<String> =>
            optional_text().title("Hospitalizaciones Previas").hidden_in_table(),

        pub lb_af: i64 => separator().title("Antecedentes Familiares"),
        pub familiares: Option<String> => optional_text()
            .control(crate::InputWidget::InputTextRich)
            .title("Informe:")
            .hidden_in_table(),

        pub lb_efps: i64 => separator().title("Examen Fisico Por Sistemas"),
        pub general: Option<String> => optional_text().title("General").hidden_in_table(),
        pub neurologico: Option<String> => optional_text().title("Neurologico").hidden_in_table(),
        pub respiratorio: Option<String> =>
            optional_text().title("Respiratorio").hidden_in_table(),
        pub cardiovascular: Option<String> =>
            optional_text().title("Cardiovascular").hidden_in_table(),
        pub gastrointestinal: Option<String> =>
            optional_text().title("Gastrointestinal").hidden_in_table(),
        pub genitourinario: Option<String> =>
            optional_text().title("Genitourinario").hidden_in_table(),
        pub musculo_esqueletico: Option<String> =>
            optional_text().title("Musculo-esqueletico").hidden_in_table(),
        pub dermatologico: Option<String> =>
            optional_text().title("Dermatologico").hidden_in_table(),
        pub endocrino: Option<String> => optional_text().title("Endocrino").hidden_in_table(),
        pub psiquiatrico: Option<String> =>
            optional_text().title("Psiquiátrico").hidden_in_table(),

        pub lb_ef: i64 => separator().title("Examen Fisico"),
        pub tension: Option<String> => optional_text().title("Tension Arterial").hidden_in_table(),
        pub frecuenciac: Option<f64> =>
            optional_real().title("Frecuencia Cardiaca").hidden_in_table(),
        pub frecuenciar: Option<f64> =>
            optional_real().title("Frecuencia Respiratoria").hidden_in_table(),
        pub temp: Option<f64> => optional_real().title("Temperatura Corporal").hidden_in_table(),
        pub satur: Option<f64> =>
            optional_real().title("Saturacion de Oxigeno").hidden_in_table(),
        pub peso: Option<f64> => optional_real().title("Peso").hidden_in_table(),
        pub talla: Option<f64> => optional_real().title("Talla").hidden_in_table(),
        pub imc: Option<f64> => optional_real().title("IMC").hidden_in_table(),
        pub observaciones: Option<String> => optional_text()
            .control(crate::InputWidget::InputTextRich)
            .title("Observaciones")
            .hidden_in_table(),

        pub lb_pf: i64 => separator().title("Profesional"),
        pub pfnombre: Option<String> =>
            optional_text().title("Profesional").required().searchable(),
        pub pfnumero_registro: Option<String> =>
            optional_text().title("Numero de Registro").required().hidden_in_table(),
        pub pfespecialidad: Option<String> =>
            optional_text().title("Especialidad").required().hidden_in_table(),
        pub pffirma_digital: Option<String> =>
            optional_text().title("Firma").required().hidden_in_table(),

        pub lb_sg: i64 => separator().title("Seguimiento"),
        pub ls_sg: Vec<FollowUp> => list(FollowUp::RECORD_TYPE).hidden_in_table(),
        pub lb_pm: i64 => separator().title("Plan Manejo"),
        pub ls_pm: Vec<ManagementPlan> => list(ManagementPlan::RECORD_TYPE).hidden_in_table(),
    }
}

impl Patient {
    /// A new, unsaved patient with only the full name filled in.
    pub fn named(nombre_completo: impl Into<String>) -> Self {
        Self {
            nombre_completo: Some(nombre_completo.into()),
            ..Self::default()
        }
    }
}

/// Every persisted record type of the clinic, in creation order.
pub const CLINIC_RECORD_TYPES: [&RecordType; 4] = [
    Patient::RECORD_TYPE,
    MedicalConsultation::RECORD_TYPE,
    FollowUp::RECORD_TYPE,
    ManagementPlan::RECORD_TYPE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_record_type;
    use crate::{SemanticType, Value};

    #[test]
    fn test_clinic_record_types_are_valid() {
        for rt in CLINIC_RECORD_TYPES {
            assert!(validate_record_type(rt).is_empty(), "{} is invalid", rt.name);
        }
    }

    #[test]
    fn test_patient_columns_skip_separators() {
        let rt = Patient::RECORD_TYPE;
        assert_eq!(rt.fields.len(), 53);
        assert!(rt.persisted_fields().all(|f| !f.name.starts_with("lb_")));
        assert_eq!(rt.column_count(), 45);
    }

    #[test]
    fn test_patient_list_fields_point_at_elements() {
        let ls_sg = Patient::RECORD_TYPE.field("ls_sg").unwrap();
        assert_eq!(ls_sg.semantic_type, SemanticType::List(FollowUp::RECORD_TYPE));
        assert_eq!(
            ls_sg.semantic_type.list_element().map(|rt| rt.name),
            Some("FollowUp")
        );
    }

    #[test]
    fn test_patient_searchable_fields() {
        let names: Vec<_> = Patient::RECORD_TYPE
            .searchable_fields()
            .map(|f| f.name)
            .collect();
        assert_eq!(
            names,
            vec!["nombre_completo", "fecha_nacimiento", "edad", "genero", "cedula", "pfnombre"]
        );
    }

    #[test]
    fn test_patient_round_trips_through_instance() {
        let mut patient = Patient::named("Ana María");
        patient.id = 12;
        patient.peso = Some(61.5);
        patient.fecha_nacimiento = NaiveDate::from_ymd_opt(1988, 2, 29);
        patient.ls_sg.push(FollowUp {
            fecha_proximo_control: NaiveDate::from_ymd_opt(2025, 6, 1),
            observaciones_adicionales: Some("control".into()),
        });

        let instance = patient.to_instance();
        assert_eq!(instance.get("peso"), Some(&Value::Real(61.5)));
        assert!(matches!(instance.get("ls_sg"), Some(Value::List(items)) if items.len() == 1));

        assert_eq!(Patient::from_instance(instance).unwrap(), patient);
    }
}
