//! Generator for course completion certificates.
//!
//! The layout lives in `static/certificate.typ`. For each record the
//! generator writes a copy of that template whose parameter defaults carry
//! the record, identifier and style values, then hands it to the
//! [`TypstRenderEngine`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::common::{bullet_lines, escape_typst_string, get_static_dir, typst_string_array};
use super::engine::{Attachment, PdfCompiler, TypstRenderEngine};
use super::render_config::{RenderConfig, Variant};
use super::traits::DocumentRenderer;
use super::RenderError;
use crate::certificate::identifier::CertificateId;
use crate::certificate::record::Record;

const TEMPLATE_FILE: &str = "certificate.typ";
const TEMPLATE_CALL: &str = "#certificate()";
const BACKGROUND_STEM: &str = "background";

pub const AWARD_TEXT: &str = "This certificate is awarded to:";
pub const COMPLETION_TEXT: &str = "for successfully completing the course:";

/// Renders one certificate per record.
pub struct CertificateGenerator {
    template: String,
    config_path: PathBuf,
    engine: TypstRenderEngine,
}

impl CertificateGenerator {
    /// Create a generator using the bundled template.
    pub fn new(
        config_path: impl Into<PathBuf>,
        compiler: Arc<dyn PdfCompiler>,
    ) -> Result<Self, RenderError> {
        let template_path = get_static_dir().join(TEMPLATE_FILE);
        let template = fs::read_to_string(&template_path).map_err(RenderError::TemplateIo)?;
        Ok(Self::with_template(template, config_path, compiler))
    }

    pub fn with_template(
        template: String,
        config_path: impl Into<PathBuf>,
        compiler: Arc<dyn PdfCompiler>,
    ) -> Self {
        Self {
            template,
            config_path: config_path.into(),
            engine: TypstRenderEngine::new(compiler),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Render with an already loaded configuration.
    pub fn render_with_config(
        &self,
        record: &Record,
        identifier: &CertificateId,
        variant: Variant,
        config: &RenderConfig,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let attachment = config.resolve_background(variant).map(|path| {
            let name = match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) => format!("{}.{}", BACKGROUND_STEM, ext),
                None => BACKGROUND_STEM.to_string(),
            };
            Attachment {
                name,
                source_path: path,
            }
        });

        if attachment.is_none() {
            log::debug!(
                "No background image for variant {:?}; using flat background colour",
                variant
            );
        }

        let source = self.render_source(
            record,
            identifier,
            config,
            attachment.as_ref().map(|a| a.name.as_str()),
        );

        let attachments: Vec<Attachment> = attachment.into_iter().collect();
        self.engine.render(&source, &attachments, output_path)
    }

    /// Build the Typst source for one certificate.
    pub fn render_source(
        &self,
        record: &Record,
        identifier: &CertificateId,
        config: &RenderConfig,
        background_image: Option<&str>,
    ) -> String {
        let sizes = &config.font_sizes;
        let offsets = &config.offsets;
        let background = match background_image {
            Some(name) => format!("\"{}\"", escape_typst_string(name)),
            None => "none".to_string(),
        };

        format!(
            r#"#let certificate(
  data: (
    person_name: "{person_name}",
    course_name: "{course_name}",
    description_lines: {description_lines},
    course_date: "{course_date}",
    identifier: "{identifier}",
  ),
  style: (
    font: "{font}",
    header_text: "{header_text}",
    footer_text: "{footer_text}",
    award_text: "{award_text}",
    completion_text: "{completion_text}",
    background_color: {background_color},
    header_color: {header_color},
    footer_color: {footer_color},
    background_image: {background},
    size: (
      header: {s_header}pt, course_name: {s_course}pt, default: {s_default}pt, person_name: {s_person}pt,
      description: {s_description}pt, date: {s_date}pt, identifier: {s_identifier}pt, footer: {s_footer}pt,
    ),
    offset: (
      header: {o_header}mm, course_name: {o_course}mm, award_text: {o_award}mm, person_name: {o_person}mm,
      completion_text: {o_completion}mm, description: {o_description}mm, date: {o_date}mm,
      identifier: {o_identifier}mm, footer: {o_footer}mm,
    ),
  ),
) = {{{body}
{call}
"#,
            person_name = escape_typst_string(record.person_name.trim()),
            course_name = escape_typst_string(record.course_name.trim()),
            description_lines = typst_string_array(&bullet_lines(&record.course_description)),
            course_date = escape_typst_string(record.course_date.trim()),
            identifier = escape_typst_string(&identifier.to_string()),
            font = escape_typst_string(&config.font_name),
            header_text = escape_typst_string(&config.header_text),
            footer_text = escape_typst_string(&config.footer_text),
            award_text = AWARD_TEXT,
            completion_text = COMPLETION_TEXT,
            background_color = config.colors.background.to_typst(),
            header_color = config.colors.header.to_typst(),
            footer_color = config.colors.footer.to_typst(),
            background = background,
            s_header = sizes.header,
            s_course = sizes.course_name,
            s_default = sizes.default,
            s_person = sizes.person_name,
            s_description = sizes.description,
            s_date = sizes.date,
            s_identifier = sizes.identifier,
            s_footer = sizes.footer,
            o_header = offsets.header,
            o_course = offsets.course_name,
            o_award = offsets.award_text,
            o_person = offsets.person_name,
            o_completion = offsets.completion_text,
            o_description = offsets.description,
            o_date = offsets.date,
            o_identifier = offsets.identifier,
            o_footer = offsets.footer,
            body = self.extract_function_body(),
            call = TEMPLATE_CALL,
        )
    }

    /// Template text between the parameter list and the trailing call,
    /// including the closing brace of the function.
    fn extract_function_body(&self) -> &str {
        if let Some(start) = self.template.find(") = {") {
            let body_start = start + 5;
            if let Some(end) = self.template.rfind(TEMPLATE_CALL) {
                if end > body_start {
                    return &self.template[body_start..end];
                }
            }
        }
        &self.template
    }
}

impl DocumentRenderer for CertificateGenerator {
    /// Load the configuration and render. The configuration is read on every
    /// call; a malformed file fails this certificate only.
    fn render(
        &self,
        record: &Record,
        identifier: &CertificateId,
        variant: Variant,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let config = RenderConfig::load(&self.config_path)?;
        self.render_with_config(record, identifier, variant, &config, output_path)
    }
}
