//! Composition of the outbound generation payload.
//!
//! Produces a single `generateContent` request body with the user parts in a
//! fixed order: the style reference images, the instruction text, then the
//! uploaded photo. The instruction wording and the ordering are part of the
//! contract with the model provider; changing either changes output quality.
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};

use crate::prompt::references::ReferenceImage;
use crate::upload::UploadedImage;

const AVATAR_STYLE_PROMPT: &str = r#"STYLE REFERENCE EXAMPLES: The first 2 images show the EXACT Notion avatar style to replicate.

TASK: Convert the final photo into the same minimalist black and white avatar style as the reference examples.

CRITICAL: FACE AND HEAD ONLY
• Show ONLY the person's face and head - nothing below the neck
• Even if the source photo shows shoulders, chest, or body - ignore these parts
• Focus exclusively on facial features, hair, and head shape
• Create a head-and-shoulders composition but only draw the head part

STYLE REQUIREMENTS (match references exactly):
• Pure black lines on white background
• Clean, simple geometric shapes
• Minimalist cartoon illustration
• Square format (1:1 aspect ratio)
• Thick, bold black line weight (not thin lines)
• Strong contrast and bold styling

ANALYZE THE PERSON CAREFULLY:
• Look ONLY at what is actually visible in the photo
• Hair style, glasses, face shape, actual facial hair presence
• Do NOT assume or add features that aren't clearly visible

CONVERT FOLLOWING THESE RULES:

FACE:
• Simple oval/circle matching their actual face shape
• EYES: Be creative but accurate - use ovals, circles, or simple shapes that match their eye shape and expression. Can show eyelashes, eye direction, or subtle expressions if visible in source
• EYEBROWS: Match their actual eyebrow shape and thickness - can be straight lines, arches, or thick shapes depending on the person's real eyebrows
• Minimal nose indication (small line or dot)
• Simple curved line for mouth that reflects their expression
• Stay true to their actual facial structure and expressions

HAIR:
• Bold, solid black shapes with thick outlines
• Match their actual hair volume and style
• For curly hair: simple wavy shapes, not overly dense
• For straight hair: clean geometric shapes
• Keep hair proportionate and realistic to source
• Use thick black lines consistent with Notion style

FACIAL HAIR - CRITICAL RULE:
• ONLY add facial hair if it's CLEARLY visible in the source photo
• If the person appears clean-shaven, DO NOT add any beard or mustache
• If uncertain about facial hair presence, leave the face clean
• When facial hair IS present: use light, minimal black shapes

GENDER REPRESENTATION:
• Focus on accuracy over gender stereotypes
• Use subtle differences in face shape and features
• Don't over-emphasize masculine/feminine traits
• Eye and eyebrow styles should match the individual, not gender assumptions

ACCESSORIES:
• Glasses: Simple geometric frame shapes
• Keep essential identifying accessories

COMPOSITION:
• HEAD AND FACE ONLY - no clothing, no body parts
• If you must show a tiny bit of neck/collar area, keep it minimal
• Focus 95% on the face and hair

FINAL INSTRUCTION:
Create a clean, conservative Notion-style avatar that:
• Accurately represents ONLY what's visible in the source photo
• Uses subtle, proportionate styling - not heavy or exaggerated
• Preserves the person's actual identity without adding fictional elements
• Matches the reference style while staying true to the source image

REMEMBER: When in doubt, be conservative and accurate rather than stylized."#;

fn inline_data_part(bytes: &[u8], mime_type: &str) -> Value {
    json!({
        "inlineData": {
            "mimeType": mime_type,
            "data": general_purpose::STANDARD.encode(bytes)
        }
    })
}

/// Pure, side-effect-free assembly of the request body sent upstream.
pub struct PromptComposer {
    references: Vec<ReferenceImage>,
}

impl PromptComposer {
    pub fn new(references: Vec<ReferenceImage>) -> Self {
        PromptComposer { references }
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Build the `generateContent` body for one uploaded photo.
    pub fn compose(&self, user_image: &UploadedImage) -> Value {
        let mut parts: Vec<Value> = self
            .references
            .iter()
            .map(|r| inline_data_part(&r.bytes, &r.mime_type))
            .collect();
        parts.push(json!({ "text": AVATAR_STYLE_PROMPT }));
        parts.push(inline_data_part(&user_image.bytes, &user_image.content_type));

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"]
            }
        })
    }
}
