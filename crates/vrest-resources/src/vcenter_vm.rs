//! Virtual machines (`vcenter_vm`)
//!
//! Objects carry a server-assigned identifier (`vm`). When it is not
//! supplied, the machine is looked up by `name` through the list endpoint.

use vrest_core::arguments::{ArgumentSpec, ArgumentType, RequiredIf};
use vrest_core::descriptor::{
    Fields, HttpMethod, NaturalKey, OperationDescriptor, OperationKind, ResourceDescriptor,
};
use vrest_core::params::DesiredState;

const VM: &[(&str, &str)] = &[("vm", "vm")];

static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "list",
        method: HttpMethod::Get,
        path: "/api/vcenter/vm",
        kind: OperationKind::Read,
        fields: Fields::query(&[
            ("clusters", "clusters"),
            ("datacenters", "datacenters"),
            ("folders", "folders"),
            ("hosts", "hosts"),
            ("names", "names"),
            ("power_states", "power_states"),
            ("resource_pools", "resource_pools"),
            ("vms", "vms"),
        ]),
    },
    OperationDescriptor {
        name: "get",
        method: HttpMethod::Get,
        path: "/api/vcenter/vm/{vm}",
        kind: OperationKind::Read,
        fields: Fields::path(VM),
    },
    OperationDescriptor {
        name: "create",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm",
        kind: OperationKind::Create,
        fields: Fields::body(&[
            ("boot", "boot"),
            ("boot_devices", "boot_devices"),
            ("cdroms", "cdroms"),
            ("cpu", "cpu"),
            ("disks", "disks"),
            ("floppies", "floppies"),
            ("guest_OS", "guest_OS"),
            ("hardware_version", "hardware_version"),
            ("memory", "memory"),
            ("name", "name"),
            ("nics", "nics"),
            ("parallel_ports", "parallel_ports"),
            ("placement", "placement"),
            ("sata_adapters", "sata_adapters"),
            ("scsi_adapters", "scsi_adapters"),
            ("serial_ports", "serial_ports"),
            ("storage_policy", "storage_policy"),
        ]),
    },
    OperationDescriptor {
        name: "delete",
        method: HttpMethod::Delete,
        path: "/api/vcenter/vm/{vm}",
        kind: OperationKind::Delete,
        fields: Fields::path(VM),
    },
    OperationDescriptor {
        name: "relocate",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm/{vm}?action=relocate&vmw-task=true",
        kind: OperationKind::Action,
        fields: Fields::path_and_body(VM, &[("disks", "disks"), ("placement", "placement")]),
    },
    OperationDescriptor {
        name: "unregister",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm/{vm}?action=unregister",
        kind: OperationKind::Action,
        fields: Fields::path(VM),
    },
    OperationDescriptor {
        name: "clone",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm?action=clone&vmw-task=true",
        kind: OperationKind::Action,
        fields: Fields::body(&[
            ("disks_to_remove", "disks_to_remove"),
            ("disks_to_update", "disks_to_update"),
            ("guest_customization_spec", "guest_customization_spec"),
            ("name", "name"),
            ("placement", "placement"),
            ("power_on", "power_on"),
            ("source", "source"),
        ]),
    },
    OperationDescriptor {
        name: "instant_clone",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm?action=instant-clone",
        kind: OperationKind::Action,
        fields: Fields::body(&[
            ("bios_uuid", "bios_uuid"),
            ("disconnect_all_nics", "disconnect_all_nics"),
            ("name", "name"),
            ("nics_to_update", "nics_to_update"),
            ("parallel_ports_to_update", "parallel_ports_to_update"),
            ("placement", "placement"),
            ("serial_ports_to_update", "serial_ports_to_update"),
            ("source", "source"),
        ]),
    },
    OperationDescriptor {
        name: "register",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm?action=register",
        kind: OperationKind::Action,
        fields: Fields::body(&[
            ("datastore", "datastore"),
            ("datastore_path", "datastore_path"),
            ("name", "name"),
            ("path", "path"),
            ("placement", "placement"),
        ]),
    },
];

/// Guest operating system identifiers accepted by the server
pub const GUEST_OS: &[&str] = &[
    "AMAZONLINUX2_64", "AMAZONLINUX3_64", "ASIANUX_3", "ASIANUX_3_64", "ASIANUX_4",
    "ASIANUX_4_64", "ASIANUX_5_64", "ASIANUX_7_64", "ASIANUX_8_64", "ASIANUX_9_64", "CENTOS",
    "CENTOS_6", "CENTOS_64", "CENTOS_6_64", "CENTOS_7", "CENTOS_7_64", "CENTOS_8_64",
    "CENTOS_9_64", "COREOS_64", "CRXPOD_1", "DARWIN", "DARWIN_10", "DARWIN_10_64",
    "DARWIN_11", "DARWIN_11_64", "DARWIN_12_64", "DARWIN_13_64", "DARWIN_14_64",
    "DARWIN_15_64", "DARWIN_16_64", "DARWIN_17_64", "DARWIN_18_64", "DARWIN_19_64",
    "DARWIN_20_64", "DARWIN_21_64", "DARWIN_64", "DEBIAN_10", "DEBIAN_10_64", "DEBIAN_11",
    "DEBIAN_11_64", "DEBIAN_4", "DEBIAN_4_64", "DEBIAN_5", "DEBIAN_5_64", "DEBIAN_6",
    "DEBIAN_6_64", "DEBIAN_7", "DEBIAN_7_64", "DEBIAN_8", "DEBIAN_8_64", "DEBIAN_9",
    "DEBIAN_9_64", "DOS", "ECOMSTATION", "ECOMSTATION_2", "FEDORA", "FEDORA_64", "FREEBSD",
    "FREEBSD_11", "FREEBSD_11_64", "FREEBSD_12", "FREEBSD_12_64", "FREEBSD_13",
    "FREEBSD_13_64", "FREEBSD_64", "GENERIC_LINUX", "MANDRAKE", "MANDRIVA", "MANDRIVA_64",
    "NETWARE_4", "NETWARE_5", "NETWARE_6", "NLD_9", "OES", "OPENSERVER_5", "OPENSERVER_6",
    "OPENSUSE", "OPENSUSE_64", "ORACLE_LINUX", "ORACLE_LINUX_6", "ORACLE_LINUX_64",
    "ORACLE_LINUX_6_64", "ORACLE_LINUX_7", "ORACLE_LINUX_7_64", "ORACLE_LINUX_8_64",
    "ORACLE_LINUX_9_64", "OS2", "OTHER", "OTHER_24X_LINUX", "OTHER_24X_LINUX_64",
    "OTHER_26X_LINUX", "OTHER_26X_LINUX_64", "OTHER_3X_LINUX", "OTHER_3X_LINUX_64",
    "OTHER_4X_LINUX", "OTHER_4X_LINUX_64", "OTHER_5X_LINUX", "OTHER_5X_LINUX_64", "OTHER_64",
    "OTHER_LINUX", "OTHER_LINUX_64", "REDHAT", "RHEL_2", "RHEL_3", "RHEL_3_64", "RHEL_4",
    "RHEL_4_64", "RHEL_5", "RHEL_5_64", "RHEL_6", "RHEL_6_64", "RHEL_7", "RHEL_7_64",
    "RHEL_8_64", "RHEL_9_64", "SJDS", "SLES", "SLES_10", "SLES_10_64", "SLES_11",
    "SLES_11_64", "SLES_12", "SLES_12_64", "SLES_15_64", "SLES_16_64", "SLES_64",
    "SOLARIS_10", "SOLARIS_10_64", "SOLARIS_11_64", "SOLARIS_6", "SOLARIS_7", "SOLARIS_8",
    "SOLARIS_9", "SUSE", "SUSE_64", "TURBO_LINUX", "TURBO_LINUX_64", "UBUNTU", "UBUNTU_64",
    "UNIXWARE_7", "VMKERNEL", "VMKERNEL_5", "VMKERNEL_6", "VMKERNEL_65", "VMKERNEL_7",
    "VMWARE_PHOTON_64", "WINDOWS_7", "WINDOWS_7_64", "WINDOWS_7_SERVER_64", "WINDOWS_8",
    "WINDOWS_8_64", "WINDOWS_8_SERVER_64", "WINDOWS_9", "WINDOWS_9_64",
    "WINDOWS_9_SERVER_64", "WINDOWS_HYPERV", "WINDOWS_SERVER_2019", "WINDOWS_SERVER_2021",
    "WIN_2000_ADV_SERV", "WIN_2000_PRO", "WIN_2000_SERV", "WIN_31", "WIN_95", "WIN_98",
    "WIN_LONGHORN", "WIN_LONGHORN_64", "WIN_ME", "WIN_NET_BUSINESS", "WIN_NET_DATACENTER",
    "WIN_NET_DATACENTER_64", "WIN_NET_ENTERPRISE", "WIN_NET_ENTERPRISE_64",
    "WIN_NET_STANDARD", "WIN_NET_STANDARD_64", "WIN_NET_WEB", "WIN_NT", "WIN_VISTA",
    "WIN_VISTA_64", "WIN_XP_HOME", "WIN_XP_PRO", "WIN_XP_PRO_64",
];

/// Virtual hardware versions
pub const HARDWARE_VERSIONS: &[&str] = &[
    "VMX_03", "VMX_04", "VMX_06", "VMX_07", "VMX_08", "VMX_09", "VMX_10", "VMX_11", "VMX_12",
    "VMX_13", "VMX_14", "VMX_15", "VMX_16", "VMX_17", "VMX_18", "VMX_19",
];

static ARGUMENTS: &[ArgumentSpec] = &[
    ArgumentSpec::new("bios_uuid", ArgumentType::Str),
    ArgumentSpec::new("boot", ArgumentType::Dict),
    ArgumentSpec::new("boot_devices", ArgumentType::List),
    ArgumentSpec::new("cdroms", ArgumentType::List),
    ArgumentSpec::new("cpu", ArgumentType::Dict),
    ArgumentSpec::new("datastore", ArgumentType::Str),
    ArgumentSpec::new("datastore_path", ArgumentType::Str),
    ArgumentSpec::new("disconnect_all_nics", ArgumentType::Bool),
    ArgumentSpec::new("disks", ArgumentType::List),
    ArgumentSpec::new("disks_to_remove", ArgumentType::StrList),
    ArgumentSpec::new("disks_to_update", ArgumentType::Dict),
    ArgumentSpec::new("floppies", ArgumentType::List),
    ArgumentSpec::new("guest_OS", ArgumentType::Str).choices(GUEST_OS),
    ArgumentSpec::new("guest_customization_spec", ArgumentType::Dict),
    ArgumentSpec::new("hardware_version", ArgumentType::Str).choices(HARDWARE_VERSIONS),
    ArgumentSpec::new("memory", ArgumentType::Dict),
    ArgumentSpec::new("name", ArgumentType::Str),
    ArgumentSpec::new("nics", ArgumentType::List),
    ArgumentSpec::new("nics_to_update", ArgumentType::Dict),
    ArgumentSpec::new("parallel_ports", ArgumentType::List),
    ArgumentSpec::new("parallel_ports_to_update", ArgumentType::Dict),
    ArgumentSpec::new("path", ArgumentType::Str),
    ArgumentSpec::new("placement", ArgumentType::Dict),
    ArgumentSpec::new("power_on", ArgumentType::Bool),
    ArgumentSpec::new("sata_adapters", ArgumentType::List),
    ArgumentSpec::new("scsi_adapters", ArgumentType::List),
    ArgumentSpec::new("serial_ports", ArgumentType::List),
    ArgumentSpec::new("serial_ports_to_update", ArgumentType::Dict),
    ArgumentSpec::new("source", ArgumentType::Str),
    ArgumentSpec::new("storage_policy", ArgumentType::Dict),
    ArgumentSpec::new("vm", ArgumentType::Str),
];

static REQUIRED_IF: &[RequiredIf] = &[
    RequiredIf { state: DesiredState::Absent, fields: &["vm"] },
    RequiredIf { state: DesiredState::Relocate, fields: &["vm"] },
    RequiredIf { state: DesiredState::Unregister, fields: &["vm"] },
    RequiredIf { state: DesiredState::Clone, fields: &["name", "source"] },
    RequiredIf { state: DesiredState::InstantClone, fields: &["name", "source"] },
    RequiredIf { state: DesiredState::Register, fields: &["name"] },
];

/// Descriptor of the `vcenter_vm` resource kind
pub static VCENTER_VM: ResourceDescriptor = ResourceDescriptor {
    kind: "vcenter_vm",
    operations: OPERATIONS,
    arguments: ARGUMENTS,
    required_if: REQUIRED_IF,
    states: &[
        DesiredState::Absent,
        DesiredState::Clone,
        DesiredState::InstantClone,
        DesiredState::Present,
        DesiredState::Register,
        DesiredState::Relocate,
        DesiredState::Unregister,
    ],
    default_state: DesiredState::Present,
    identifier: Some("vm"),
    natural_key: Some(NaturalKey {
        field: "name",
        filter: "names",
        id_key: "vm",
    }),
    nested_config: None,
};
