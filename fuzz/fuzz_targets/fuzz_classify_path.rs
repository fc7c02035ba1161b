// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use schemaroute::classify::{ClassifyContext, PathClassifier};
use schemaroute::connection::build_identity;
use schemaroute::fs::LocalFs;
use schemaroute::project::ProjectModel;
use schemaroute::source::{RawTopology, SourceKind};

#[derive(Debug, Arbitrary)]
struct Input {
    path: String,
    mode: String,
    selected: Option<String>,
    admin: Option<String>,
}

fuzz_target!(|input: Input| {
    let model = ProjectModel::from_raw(
        RawTopology {
            project_name: Some("fz".into()),
            project_mode: Some(input.mode),
            db_app_user: Some("fz_depl".into()),
            db_admin_user: input.admin,
            db_tns: Some("xe".into()),
            ..Default::default()
        },
        SourceKind::EnvFiles,
    );

    // Nothing below the root exists, so hook lookups find no folders
    let classifier = PathClassifier::new(&LocalFs, "/nonexistent/schemaroute-fuzz");
    let mut ctx = ClassifyContext::default();
    if let Some(schema) = input.selected.as_deref() {
        ctx = ctx.with_selected(schema);
    }

    if let Ok(schema) = classifier.classify_schema(&input.path, &model, ctx) {
        assert!(!schema.is_empty());
        let _ = build_identity(&schema, &model);
    }
});
