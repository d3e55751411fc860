//! Print the VirtualMachine CRD as YAML

use kube::CustomResourceExt;

fn main() {
    let crd = vm_manifests::VirtualMachine::crd();
    match serde_yaml::to_string(&crd) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => {
            eprintln!("failed to render CRD: {e}");
            std::process::exit(1);
        }
    }
}
