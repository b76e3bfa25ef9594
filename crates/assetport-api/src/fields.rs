//! Wire field names of each record type
//!
//! These are the keys the import endpoint understands. Input keys are matched
//! against them case-sensitively after casing normalization.

macro_rules! wire_fields {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $wire, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Every field, in schema order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name of the field on the wire
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Look up a field by its exact wire name
            #[must_use]
            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_fields! {
    /// Fields of [`crate::asset::ImportAsset`]
    AssetField {
        Id => "id",
        RunZeroId => "runZeroID",
        NetworkInterfaces => "networkInterfaces",
        Hostnames => "hostnames",
        Domain => "domain",
        FirstSeenTs => "firstSeenTS",
        LastSeenTs => "lastSeenTS",
        Os => "os",
        OsVersion => "osVersion",
        Manufacturer => "manufacturer",
        Model => "model",
        Tags => "tags",
        DeviceType => "deviceType",
        CustomAttributes => "customAttributes",
        Software => "software",
        Vulnerabilities => "vulnerabilities",
        Services => "services",
    }
}

wire_fields! {
    /// Fields of [`crate::asset::NetworkInterface`]
    NetworkInterfaceField {
        MacAddress => "macAddress",
        Ipv4Addresses => "ipv4Addresses",
        Ipv6Addresses => "ipv6Addresses",
    }
}

wire_fields! {
    /// Fields of [`crate::software::Software`]
    SoftwareField {
        Id => "id",
        InstalledAt => "installedAt",
        InstalledFrom => "installedFrom",
        InstalledSize => "installedSize",
        ServiceAddress => "serviceAddress",
        ServicePort => "servicePort",
        ServiceTransport => "serviceTransport",
        Vendor => "vendor",
        Product => "product",
        Version => "version",
        Update => "update",
        Edition => "edition",
        Language => "language",
        SwEdition => "swEdition",
        TargetSw => "targetSW",
        TargetHw => "targetHW",
        Other => "other",
        Cpe23 => "cpe23",
        CustomAttributes => "customAttributes",
    }
}

wire_fields! {
    /// Fields of [`crate::vulnerability::Vulnerability`]
    VulnerabilityField {
        Id => "id",
        Name => "name",
        Description => "description",
        Solution => "solution",
        Cve => "cve",
        Cpe23 => "cpe23",
        ServiceAddress => "serviceAddress",
        ServicePort => "servicePort",
        ServiceTransport => "serviceTransport",
        Cvss2BaseScore => "cvss2BaseScore",
        Cvss2TemporalScore => "cvss2TemporalScore",
        Cvss3BaseScore => "cvss3BaseScore",
        Cvss3TemporalScore => "cvss3TemporalScore",
        SeverityScore => "severityScore",
        SeverityRank => "severityRank",
        RiskScore => "riskScore",
        RiskRank => "riskRank",
        Exploitable => "exploitable",
        FirstDetectedTs => "firstDetectedTS",
        LastDetectedTs => "lastDetectedTS",
        PublishedTs => "publishedTS",
        CustomAttributes => "customAttributes",
    }
}

wire_fields! {
    /// Fields of [`crate::service::Service`]
    ServiceField {
        Address => "address",
        Port => "port",
        Transport => "transport",
        Vhost => "vhost",
        Protocols => "protocols",
        CustomAttributes => "customAttributes",
    }
}
