//! Step 3 - address, guardian and payment preferences

use serde::{Deserialize, Serialize};

use crate::core::store::PersistedState;
use crate::entities::{take_present, FormGroup, Group, GroupPatch, PaymentMode, PaymentPlan};
use crate::schema::validator::FieldError;

/// In-progress address and guardian details as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressGuardianDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_mobile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
}

/// Validated address and guardian details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressGuardian {
    pub pin_code: String,
    /// Canonical state/UT name
    pub state: String,
    pub city: String,
    pub address_line: String,
    pub guardian_name: String,
    pub guardian_mobile: String,
    pub payment_plan: PaymentPlan,
    pub payment_mode: PaymentMode,
}

impl From<&AddressGuardian> for AddressGuardianDraft {
    fn from(details: &AddressGuardian) -> Self {
        Self {
            pin_code: Some(details.pin_code.clone()),
            state: Some(details.state.clone()),
            city: Some(details.city.clone()),
            address_line: Some(details.address_line.clone()),
            guardian_name: Some(details.guardian_name.clone()),
            guardian_mobile: Some(details.guardian_mobile.clone()),
            payment_plan: Some(details.payment_plan.to_string()),
            payment_mode: Some(details.payment_mode.to_string()),
        }
    }
}

impl From<AddressGuardianDraft> for GroupPatch {
    fn from(draft: AddressGuardianDraft) -> Self {
        GroupPatch::AddressGuardian(draft)
    }
}

impl FormGroup for AddressGuardianDraft {
    const GROUP: Group = Group::AddressGuardian;

    const FIELDS: &'static [&'static str] = &[
        "pinCode",
        "state",
        "city",
        "addressLine",
        "guardianName",
        "guardianMobile",
        "paymentPlan",
        "paymentMode",
    ];

    fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError> {
        let value = Some(raw.to_string());
        match field {
            "pinCode" => self.pin_code = value,
            "state" => self.state = value,
            "city" => self.city = value,
            "addressLine" => self.address_line = value,
            "guardianName" => self.guardian_name = value,
            "guardianMobile" => self.guardian_mobile = value,
            "paymentPlan" => self.payment_plan = value,
            "paymentMode" => self.payment_mode = value,
            _ => return Err(FieldError::new(field, "Unknown field")),
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &str) {
        match field {
            "pinCode" => self.pin_code = None,
            "state" => self.state = None,
            "city" => self.city = None,
            "addressLine" => self.address_line = None,
            "guardianName" => self.guardian_name = None,
            "guardianMobile" => self.guardian_mobile = None,
            "paymentPlan" => self.payment_plan = None,
            "paymentMode" => self.payment_mode = None,
            _ => {}
        }
    }

    fn has_value(&self, field: &str) -> bool {
        match field {
            "pinCode" => self.pin_code.is_some(),
            "state" => self.state.is_some(),
            "city" => self.city.is_some(),
            "addressLine" => self.address_line.is_some(),
            "guardianName" => self.guardian_name.is_some(),
            "guardianMobile" => self.guardian_mobile.is_some(),
            "paymentPlan" => self.payment_plan.is_some(),
            "paymentMode" => self.payment_mode.is_some(),
            _ => false,
        }
    }

    fn merge(&mut self, patch: Self) {
        take_present(&mut self.pin_code, patch.pin_code);
        take_present(&mut self.state, patch.state);
        take_present(&mut self.city, patch.city);
        take_present(&mut self.address_line, patch.address_line);
        take_present(&mut self.guardian_name, patch.guardian_name);
        take_present(&mut self.guardian_mobile, patch.guardian_mobile);
        take_present(&mut self.payment_plan, patch.payment_plan);
        take_present(&mut self.payment_mode, patch.payment_mode);
    }

    fn slice(state: &PersistedState) -> &Self {
        &state.address_guardian
    }
}
