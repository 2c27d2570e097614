//! Catalog maintenance: sedes, services, professionals, treatments and company branding.

use crate::appointments::non_blank;
use crate::error::{ClinicError, ClinicResult};
use crate::ids::RecordId;
use crate::models::{Company, Professional, Sede, Service, Treatment};
use crate::state::{ClinicState, ClinicStore};
use clinic_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SedeInput {
    pub name: NonEmptyText,
    #[serde(default)]
    pub address: String,
    pub phone: PhoneNumber,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceInput {
    pub name: NonEmptyText,
    /// Minutes, greater than zero.
    pub duration: u32,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfessionalInput {
    pub name: NonEmptyText,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub sede_ids: Vec<RecordId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TreatmentInput {
    pub name: NonEmptyText,
    pub sessions: u32,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub description: String,
}

/// New branding settings. `None` clears an image.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: NonEmptyText,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
}

impl SedeInput {
    fn into_sede(self, id: RecordId) -> Sede {
        Sede {
            id,
            name: self.name,
            address: self.address.trim().to_string(),
            phone: self.phone,
        }
    }
}

impl ServiceInput {
    fn validate(&self) -> ClinicResult<()> {
        if self.duration == 0 {
            return Err(ClinicError::InvalidInput(
                "service duration must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn into_service(self, id: RecordId) -> Service {
        Service {
            id,
            name: self.name,
            duration: self.duration,
            price: self.price,
            category: self.category.trim().to_string(),
        }
    }
}

impl ProfessionalInput {
    fn into_professional(self, id: RecordId) -> Professional {
        let mut seen = HashSet::new();
        let sede_ids = self
            .sede_ids
            .into_iter()
            .filter(|sede_id| seen.insert(sede_id.clone()))
            .collect();
        Professional {
            id,
            name: self.name,
            specialty: self.specialty.trim().to_string(),
            avatar: non_blank(self.avatar),
            sede_ids,
        }
    }
}

impl TreatmentInput {
    fn validate(&self) -> ClinicResult<()> {
        if self.sessions == 0 {
            return Err(ClinicError::InvalidInput(
                "a treatment needs at least one session".into(),
            ));
        }
        Ok(())
    }

    fn into_treatment(self, id: RecordId) -> Treatment {
        Treatment {
            id,
            name: self.name,
            sessions: self.sessions,
            price: self.price,
            description: self.description.trim().to_string(),
        }
    }
}

/// Accepts `#rgb` or `#rrggbb`.
fn validate_hex_color(field: &str, value: &str) -> ClinicResult<()> {
    let hex = value.strip_prefix('#').unwrap_or("");
    if !matches!(hex.len(), 3 | 6) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ClinicError::InvalidInput(format!(
            "{} must be a hex colour like #0f766e, got: '{}'",
            field, value
        )));
    }
    Ok(())
}

fn position_of<T>(
    items: &[T],
    id: &RecordId,
    item_id: impl Fn(&T) -> &RecordId,
    missing: impl FnOnce(RecordId) -> ClinicError,
) -> ClinicResult<usize> {
    items
        .iter()
        .position(|item| item_id(item) == id)
        .ok_or_else(|| missing(id.clone()))
}

impl ClinicState {
    pub fn create_sede(&self, input: SedeInput) -> ClinicResult<(ClinicState, Sede)> {
        self.transition(|draft| {
            let sede = input.into_sede(RecordId::generate());
            draft.sedes.push(sede.clone());
            tracing::info!(sede_id = %sede.id, "sede created");
            Ok(sede)
        })
    }

    pub fn edit_sede(&self, id: &RecordId, input: SedeInput) -> ClinicResult<(ClinicState, Sede)> {
        let idx = position_of(&self.sedes, id, |s| &s.id, ClinicError::UnknownSede)?;
        self.transition(|draft| {
            let sede = input.into_sede(id.clone());
            draft.sedes[idx] = sede.clone();
            tracing::info!(sede_id = %id, "sede edited");
            Ok(sede)
        })
    }

    pub fn create_service(&self, input: ServiceInput) -> ClinicResult<(ClinicState, Service)> {
        input.validate()?;
        self.transition(|draft| {
            let service = input.into_service(RecordId::generate());
            draft.services.push(service.clone());
            tracing::info!(service_id = %service.id, "service created");
            Ok(service)
        })
    }

    pub fn edit_service(
        &self,
        id: &RecordId,
        input: ServiceInput,
    ) -> ClinicResult<(ClinicState, Service)> {
        let idx = position_of(&self.services, id, |s| &s.id, ClinicError::UnknownService)?;
        input.validate()?;
        self.transition(|draft| {
            let service = input.into_service(id.clone());
            draft.services[idx] = service.clone();
            tracing::info!(service_id = %id, "service edited");
            Ok(service)
        })
    }

    fn check_sede_ids(&self, sede_ids: &[RecordId]) -> ClinicResult<()> {
        for sede_id in sede_ids {
            self.require_sede(sede_id)?;
        }
        Ok(())
    }

    /// Adds a practitioner. Every listed sede must exist.
    pub fn create_professional(
        &self,
        input: ProfessionalInput,
    ) -> ClinicResult<(ClinicState, Professional)> {
        self.check_sede_ids(&input.sede_ids)?;
        self.transition(|draft| {
            let professional = input.into_professional(RecordId::generate());
            draft.professionals.push(professional.clone());
            tracing::info!(professional_id = %professional.id, "professional created");
            Ok(professional)
        })
    }

    pub fn edit_professional(
        &self,
        id: &RecordId,
        input: ProfessionalInput,
    ) -> ClinicResult<(ClinicState, Professional)> {
        let idx = position_of(
            &self.professionals,
            id,
            |p| &p.id,
            ClinicError::UnknownProfessional,
        )?;
        self.check_sede_ids(&input.sede_ids)?;
        self.transition(|draft| {
            let professional = input.into_professional(id.clone());
            draft.professionals[idx] = professional.clone();
            tracing::info!(professional_id = %id, "professional edited");
            Ok(professional)
        })
    }

    pub fn create_treatment(
        &self,
        input: TreatmentInput,
    ) -> ClinicResult<(ClinicState, Treatment)> {
        input.validate()?;
        self.transition(|draft| {
            let treatment = input.into_treatment(RecordId::generate());
            draft.treatments.push(treatment.clone());
            tracing::info!(treatment_id = %treatment.id, "treatment created");
            Ok(treatment)
        })
    }

    /// Edits a protocol. History entries keep the session total they were written with.
    pub fn edit_treatment(
        &self,
        id: &RecordId,
        input: TreatmentInput,
    ) -> ClinicResult<(ClinicState, Treatment)> {
        let idx = position_of(&self.treatments, id, |t| &t.id, ClinicError::UnknownTreatment)?;
        input.validate()?;
        self.transition(|draft| {
            let treatment = input.into_treatment(id.clone());
            draft.treatments[idx] = treatment.clone();
            tracing::info!(treatment_id = %id, "treatment edited");
            Ok(treatment)
        })
    }

    pub fn update_company(&self, update: CompanyUpdate) -> ClinicResult<(ClinicState, Company)> {
        validate_hex_color("primaryColor", &update.primary_color)?;
        validate_hex_color("secondaryColor", &update.secondary_color)?;

        self.transition(|draft| {
            draft.company = Company {
                id: draft.company.id.clone(),
                name: update.name,
                logo: non_blank(update.logo),
                background_image: non_blank(update.background_image),
                primary_color: update.primary_color,
                secondary_color: update.secondary_color,
            };
            tracing::info!("company branding updated");
            Ok(draft.company.clone())
        })
    }
}

impl ClinicStore {
    pub fn create_sede(&mut self, input: SedeInput) -> ClinicResult<Sede> {
        self.commit("create_sede", |state, _| state.create_sede(input))
    }

    pub fn edit_sede(&mut self, id: &RecordId, input: SedeInput) -> ClinicResult<Sede> {
        self.commit("edit_sede", |state, _| state.edit_sede(id, input))
    }

    pub fn create_service(&mut self, input: ServiceInput) -> ClinicResult<Service> {
        self.commit("create_service", |state, _| state.create_service(input))
    }

    pub fn edit_service(&mut self, id: &RecordId, input: ServiceInput) -> ClinicResult<Service> {
        self.commit("edit_service", |state, _| state.edit_service(id, input))
    }

    pub fn create_professional(&mut self, input: ProfessionalInput) -> ClinicResult<Professional> {
        self.commit("create_professional", |state, _| {
            state.create_professional(input)
        })
    }

    pub fn edit_professional(
        &mut self,
        id: &RecordId,
        input: ProfessionalInput,
    ) -> ClinicResult<Professional> {
        self.commit("edit_professional", |state, _| {
            state.edit_professional(id, input)
        })
    }

    pub fn create_treatment(&mut self, input: TreatmentInput) -> ClinicResult<Treatment> {
        self.commit("create_treatment", |state, _| state.create_treatment(input))
    }

    pub fn edit_treatment(
        &mut self,
        id: &RecordId,
        input: TreatmentInput,
    ) -> ClinicResult<Treatment> {
        self.commit("edit_treatment", |state, _| state.edit_treatment(id, input))
    }

    pub fn update_company(&mut self, update: CompanyUpdate) -> ClinicResult<Company> {
        self.commit("update_company", |state, _| state.update_company(update))
    }
}
