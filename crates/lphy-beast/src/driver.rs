// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::BeastContext;
use crate::options::Options;
use crate::registry::TranslatorRegistry;
use anyhow::{anyhow, Context};
use log::info;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Translates the model in `infile` and writes the BEAST 2 XML.
///
/// The output defaults to `<stem>.xml` next to the input. Nothing is written unless the
/// whole translation succeeds.
pub fn execute(infile: &Path, outfile: Option<&Path>, options: Options) -> anyhow::Result<PathBuf> {
    let stem = infile
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("cannot derive a file name stem from `{}`", infile.display()))?;
    let stem = stem.split('.').next().unwrap_or(stem).to_string();
    let outfile = match outfile {
        Some(path) => path.to_path_buf(),
        None => infile.with_file_name(format!("{}.xml", stem)),
    };

    let graph = model_graph::load_model(infile)
        .with_context(|| format!("failed to load model `{}`", infile.display()))?;
    info!(
        "loaded {} values and {} generators from {}",
        graph.values().count(),
        graph.generators().count(),
        infile.display()
    );

    let registry = Rc::new(TranslatorRegistry::standard());
    let mut context = BeastContext::new(&graph, registry, options);
    let xml = context
        .to_beast_xml(&stem)
        .with_context(|| format!("failed to translate `{}`", infile.display()))?;

    std::fs::write(&outfile, xml)
        .with_context(|| format!("failed to write `{}`", outfile.display()))?;
    Ok(outfile)
}
