//! Per-benchmark Makefile: one build target per backend, aliases without
//! the build directory, and an automated run target.
//!
//! Target and prerequisite names must agree with [`Backend::code_file_name`]
//! and [`Backend::bin_file_name`]; nothing here invokes a compiler.

use super::{Backend, BackendRegistry};
use crate::bench::BenchSpec;
use crate::config::ToolchainSet;

pub fn generate_makefile(
    bench: &BenchSpec,
    backends: &BackendRegistry,
    toolchains: &ToolchainSet,
) -> String {
    let util = Backend::UtilHeader.code_file_name(bench.name);

    let targets: Vec<String> = backends
        .all()
        .iter()
        .map(|b| format!("\t{}", b.bin_file_name(bench.name)))
        .collect();

    let build_rules: Vec<String> = backends
        .all()
        .iter()
        .map(|b| {
            let tc = toolchains.get(*b);
            let bin = b.bin_file_name(bench.name);
            let code = b.code_file_name(bench.name);
            let mut cmd = vec![tc.compiler.clone()];
            cmd.extend(tc.flags.iter().cloned());
            cmd.push("-o".to_string());
            cmd.push(format!("$(BUILD_DIR)/{bin}"));
            cmd.push(code.clone());
            cmd.extend(tc.libs.iter().cloned());
            format!(
                "$(BUILD_DIR)/{bin}: {code} {util} ../../util.h\n\t{}",
                cmd.join(" ")
            )
        })
        .collect();

    let aliases: Vec<String> = backends
        .all()
        .iter()
        .map(|b| {
            let bin = b.bin_file_name(bench.name);
            format!(".PHONY: {bin}\n{bin}: $(BUILD_DIR)/{bin}")
        })
        .collect();

    let bench_targets: Vec<String> = backends
        .all()
        .iter()
        .map(|b| {
            format!(
                "\t@echo \"{name}:\"\n\t$(BUILD_DIR)/{bin} $(PARAMETERS)\n\t@echo \"\"",
                name = b.display_name(),
                bin = b.bin_file_name(bench.name),
            )
        })
        .collect();

    format!(
        "# configuration\n\
         \n\
         TEST_CLASS = {group}\n\
         TEST_CASE  = {name}\n\
         BUILD_DIR  = ../../build/{group}/{name}\n\
         \n\
         \n\
         # default parameters\n\
         \n\
         PARAMETERS = {parameters}\n\
         \n\
         \n\
         # all\n\
         \n\
         targets = \\\n\
         {targets}\n\
         \n\
         .PHONY: all\n\
         all: mk-target-dir $(targets)\n\
         \n\
         mk-target-dir:\n\
         \tmkdir -p $(BUILD_DIR)\n\
         \n\
         \n\
         # build rules\n\
         \n\
         {build_rules}\n\
         \n\
         \n\
         # aliases without build directory\n\
         \n\
         {aliases}\n\
         \n\
         \n\
         # automated benchmark target\n\
         \n\
         .PHONY: bench\n\
         bench: all\n\
         {bench_targets}\n\
         \n\
         \n\
         # clean target\n\
         \n\
         .PHONY: clean\n\
         clean:\n\
         \trm $(targets)\n",
        group = bench.group,
        name = bench.name,
        parameters = bench.default_parameters.join(" "),
        targets = targets.join(" \\\n"),
        build_rules = build_rules.join("\n\n"),
        aliases = aliases.join("\n\n"),
        bench_targets = bench_targets.join("\n\n"),
    )
}
