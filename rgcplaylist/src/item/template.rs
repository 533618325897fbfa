//! Item gabarit libre : un template et ses données, sans slide navigable.

use serde::{Deserialize, Serialize};

use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    pub template: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub struct TemplateItem {
    pub props: TemplateProps,
}

impl TemplateItem {
    pub fn new(props: TemplateProps) -> Self {
        Self { props }
    }

    pub fn create_render_payload(&self) -> RenderPayload {
        RenderPayload::Template {
            template: self.props.template.clone(),
            data: self.props.data.clone(),
        }
    }

    pub fn update(&mut self, props: TemplateProps) {
        self.props = props;
    }
}
