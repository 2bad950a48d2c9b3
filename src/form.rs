use crate::catalog::{EndpointSpec, ParamLocation, ParameterDescriptor, DEVICE_ID_PARAM};
use crate::devices::DeviceRecord;

/// One entry of a closed selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Free text; the placeholder shows the example without entering it.
    Text { placeholder: String },
    /// Closed selection: only the listed values (or none) can be chosen.
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: String,
    pub control: Control,
}

fn unselected() -> SelectOption {
    SelectOption {
        value: String::new(),
        label: "(none)".to_string(),
    }
}

fn control_for(param: &ParameterDescriptor, devices: &[DeviceRecord]) -> Control {
    if param.name == DEVICE_ID_PARAM && !devices.is_empty() {
        let mut options = vec![unselected()];
        options.extend(devices.iter().map(|device| SelectOption {
            value: device.identifier.clone(),
            label: device.label(),
        }));
        return Control::Select { options };
    }

    if let Some(values) = &param.allowed_values {
        let mut options = vec![unselected()];
        options.extend(values.iter().map(|value| SelectOption {
            value: value.clone(),
            label: value.clone(),
        }));
        return Control::Select { options };
    }

    Control::Text {
        placeholder: param
            .example
            .clone()
            .unwrap_or_else(|| format!("Enter {}", param.name)),
    }
}

/// Derive one input control per descriptor, in declaration order.
pub fn build_form(endpoint: &EndpointSpec, devices: &[DeviceRecord]) -> Vec<FormField> {
    endpoint
        .parameters
        .iter()
        .map(|param| FormField {
            name: param.name.clone(),
            location: param.location,
            required: param.required,
            description: param.description.clone(),
            control: control_for(param, devices),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HttpMethod;

    fn param(
        name: &str,
        example: Option<&str>,
        allowed_values: Option<&[&str]>,
    ) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            location: ParamLocation::Query,
            required: false,
            description: String::new(),
            example: example.map(str::to_string),
            allowed_values: allowed_values.map(|vs| vs.iter().map(|v| v.to_string()).collect()),
        }
    }

    fn endpoint(params: Vec<ParameterDescriptor>) -> EndpointSpec {
        EndpointSpec {
            id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            method: HttpMethod::Get,
            path: "/test".to_string(),
            parameters: params,
            body_example: None,
            response_example: None,
            requires_auth: true,
            base_url: None,
            device_autofill: true,
        }
    }

    fn device(identifier: &str, title: Option<&str>) -> DeviceRecord {
        DeviceRecord {
            identifier: identifier.to_string(),
            title: title.map(str::to_string),
            system_title: None,
        }
    }

    #[test]
    fn test_text_control_with_example_placeholder() {
        let fields = build_form(&endpoint(vec![param("page", Some("1"), None)]), &[]);
        assert_eq!(
            fields[0].control,
            Control::Text {
                placeholder: "1".to_string()
            }
        );
    }

    #[test]
    fn test_text_control_without_example() {
        let fields = build_form(&endpoint(vec![param("page", None, None)]), &[]);
        assert_eq!(
            fields[0].control,
            Control::Text {
                placeholder: "Enter page".to_string()
            }
        );
    }

    #[test]
    fn test_allowed_values_become_select() {
        let fields = build_form(
            &endpoint(vec![param("granularity", None, Some(&["hour", "day"]))]),
            &[],
        );
        match &fields[0].control {
            Control::Select { options } => {
                // An unselected entry precedes the allowed values
                assert_eq!(options.len(), 3);
                assert_eq!(options[0].value, "");
                assert_eq!(options[1].value, "hour");
                assert_eq!(options[2].label, "day");
            }
            other => panic!("expected a select control, got {:?}", other),
        }
    }

    #[test]
    fn test_device_param_becomes_select_when_devices_present() {
        let fields = build_form(
            &endpoint(vec![param(DEVICE_ID_PARAM, Some("ABC123"), None)]),
            &[device("MBX-1", Some("Rooftop")), device("MBX-2", None)],
        );
        match &fields[0].control {
            Control::Select { options } => {
                assert_eq!(options[0].value, "");
                assert_eq!(options[1].value, "MBX-1");
                assert_eq!(options[1].label, "Rooftop (MBX-1)");
                assert_eq!(options[2].label, "MBX-2 (MBX-2)");
            }
            other => panic!("expected a select control, got {:?}", other),
        }
    }

    #[test]
    fn test_device_param_stays_text_without_devices() {
        let fields = build_form(
            &endpoint(vec![param(DEVICE_ID_PARAM, Some("ABC123"), None)]),
            &[],
        );
        assert_eq!(
            fields[0].control,
            Control::Text {
                placeholder: "ABC123".to_string()
            }
        );
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let fields = build_form(
            &endpoint(vec![
                param("from", None, None),
                param("to", None, None),
                param("granularity", None, Some(&["hour"])),
            ]),
            &[],
        );
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["from", "to", "granularity"]);
    }
}
