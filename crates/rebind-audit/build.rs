use std::{env, path::Path};

const FIXTURE_DIR: &str = "fixtures";

/// Runs the target C compiler with `args`, writing `output` into `out_dir`.
fn compile(out_dir: &Path, output: &str, args: &[&str]) {
    let compiler = cc::Build::new().pic(true).get_compiler();
    let mut cmd = compiler.to_command();
    cmd.args(args).arg("-o").arg(out_dir.join(output));
    assert!(
        cmd.status()
            .expect("could not run the C compiler!")
            .success(),
        "could not compile {output}"
    );
}

fn compile_fixtures(out_dir: &Path) {
    let lib_dir = format!("-L{}", out_dir.display());
    let rpath = format!("-Wl,-rpath,{}", out_dir.display());
    let src = |name: &str| format!("{FIXTURE_DIR}/{name}");
    for (lib, name) in [("libB.so", "foo_one.c"), ("libC.so", "foo_two.c")] {
        let soname = format!("-Wl,-soname,{lib}");
        compile(out_dir, lib, &["-shared", &src(name), &soname]);
    }
    compile(
        out_dir,
        "libA.so",
        &[
            "-shared",
            &src("call_foo.c"),
            "-Wl,-soname,libA.so",
            "-Wl,-z,lazy",
            &lib_dir,
            "-lB",
        ],
    );
    // libC.so is linked in only so that it is already mapped when rules point at it.
    compile(
        out_dir,
        "rebind_main",
        &[
            &src("main.c"),
            "-Wl,-z,lazy",
            "-Wl,--no-as-needed",
            &lib_dir,
            "-lA",
            "-lB",
            "-lC",
            &rpath,
        ],
    );
}

fn main() {
    println!("cargo:rerun-if-changed={FIXTURE_DIR}");
    let out_dir = env::var("OUT_DIR").unwrap();
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_env = env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    if target_os == "linux" && target_env == "gnu" {
        compile_fixtures(Path::new(&out_dir));
    }
    println!("cargo:rustc-env=TEST_ARTIFACTS={out_dir}");
}
