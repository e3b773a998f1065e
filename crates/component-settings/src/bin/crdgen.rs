use component_settings::crds::cluster::Cluster;
use kube::core::CustomResourceExt;

fn main() {
    println!("{}", serde_yaml::to_string(&Cluster::crd()).expect("serialize crd"));
}
