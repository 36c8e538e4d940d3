//! Domain barrel (`index.ts`).

use super::fs::GeneratedFile;
use super::templates::{render_with_header, BarrelTemplate};
use super::OutputPart;

/// Barrel line re-exporting `part` from the domain root, if it is a TypeScript module.
///
/// Types are re-exported flat; every other module under a namespace so names
/// from different layers never collide.
pub fn barrel_line(part: OutputPart) -> Option<String> {
    match part {
        OutputPart::Types => Some("export * from './types';".to_string()),
        OutputPart::Schemas => Some("export * as schemas from './schemas';".to_string()),
        OutputPart::Repositories => {
            Some("export * as repositories from './repositories';".to_string())
        }
        OutputPart::Handlers => Some("export * as handlers from './handlers';".to_string()),
        OutputPart::Converters => Some("export * as converters from './converters';".to_string()),
        OutputPart::Prisma | OutputPart::Tests => None,
    }
}

/// `index.ts` over the modules written in this run, in layer order.
pub fn emit_domain_index(written: &[OutputPart]) -> anyhow::Result<GeneratedFile> {
    let lines = OutputPart::ALL
        .iter()
        .filter(|part| written.contains(part))
        .filter_map(|part| barrel_line(*part))
        .collect();
    Ok(GeneratedFile::new(
        "index.ts",
        render_with_header(&BarrelTemplate { lines })?,
    ))
}
