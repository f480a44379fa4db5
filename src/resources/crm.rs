//! Customers.

use crate::model::{
    ApiResource, ConversionError, MultilanguageString, PropertyDescriptor, PropertyType,
    ResourceDescriptor, MULTILANGUAGE_STRING,
};

use super::general::{Address, Amount, ADDRESS, AMOUNT};

/// Descriptor of [`Customer`].
pub static CUSTOMER: ResourceDescriptor = ResourceDescriptor::entity(
    "Crm.Customer",
    "Crm_Customers",
    &[
        PropertyDescriptor::new("Number", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::String),
        PropertyDescriptor::new("Description", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new("Active", PropertyType::Boolean),
        PropertyDescriptor::new("CreditLimit", PropertyType::Complex(&AMOUNT)),
        PropertyDescriptor::new("Address", PropertyType::Complex(&ADDRESS)),
    ],
);

crate::domain_resource! {
    /// A party the company sells to.
    pub entity Customer => CUSTOMER;
}

impl Customer {
    /// The `Number` property.
    pub fn number(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Number")
    }

    /// Sets `Number`.
    pub fn set_number(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Number", value)
    }

    /// The `Name` property.
    pub fn name(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Name")
    }

    /// Sets `Name`.
    pub fn set_name(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Name", value)
    }

    /// The `Description` property.
    pub fn description(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Description")
    }

    /// Sets `Description`.
    pub fn set_description(&self, value: Option<MultilanguageString>) -> Result<(), ConversionError> {
        self.resource().set("Description", value)
    }

    /// The `Active` property.
    pub fn active(&self) -> Result<bool, ConversionError> {
        self.resource().get("Active")
    }

    /// Sets `Active`.
    pub fn set_active(&self, value: bool) -> Result<(), ConversionError> {
        self.resource().set("Active", value)
    }

    /// The `CreditLimit` property.
    pub fn credit_limit(&self) -> Result<Option<Amount>, ConversionError> {
        self.resource().get("CreditLimit")
    }

    /// Sets `CreditLimit`.
    pub fn set_credit_limit(&self, value: Option<Amount>) -> Result<(), ConversionError> {
        self.resource().set("CreditLimit", value)
    }

    /// The `Address` property.
    pub fn address(&self) -> Result<Option<Address>, ConversionError> {
        self.resource().get("Address")
    }

    /// Sets `Address`.
    pub fn set_address(&self, value: Option<Address>) -> Result<(), ConversionError> {
        self.resource().set("Address", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityResource, RawMap, RawValue};

    #[test]
    fn test_new_customer_is_stamped_with_its_type() {
        let customer = Customer::new();
        assert_eq!(
            customer.resource().raw("@odata.type"),
            Some(RawValue::from("Erp.Crm_Customer"))
        );
        assert_eq!(Customer::entity_set_name().unwrap(), "Crm_Customers");
    }

    #[test]
    fn test_inactive_customer_reads_false_when_missing() {
        let customer = Customer::create(RawMap::new());
        assert!(!customer.active().unwrap());
        customer.set_active(true).unwrap();
        assert!(customer.active().unwrap());
    }

    #[test]
    fn test_nested_credit_limit_change_marks_customer() {
        let customer = Customer::new();
        customer.set_credit_limit(Some(Amount::of(1000.0, "BGN").unwrap())).unwrap();
        customer.resource().clear_changes();

        let limit = customer.credit_limit().unwrap().unwrap();
        limit.set_value(2500.0).unwrap();

        assert!(customer.resource().is_property_modified("CreditLimit"));
        let changes = customer.resource().raw_changes().unwrap();
        assert!(changes.contains_key("CreditLimit"));
    }

    #[test]
    fn test_description_by_language() {
        let customer = Customer::new();
        customer
            .set_description(Some(MultilanguageString::from_pairs([("en", "Retail")]).unwrap()))
            .unwrap();
        let description = customer.description().unwrap().unwrap();
        assert_eq!(description.get("EN").unwrap().as_deref(), Some("Retail"));
    }
}
