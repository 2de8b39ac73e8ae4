//! Default payloads for a MySQL Cluster (NDB) tarball install on Debian/Ubuntu

use super::step::StepId;

const PURGE: &str = r#"export DEBIAN_FRONTEND=noninteractive
if [ -x /etc/init.d/mysql.server ]; then /etc/init.d/mysql.server stop || true; fi
service mysql stop 2>/dev/null || true
for daemon in mysqld_safe mysqld ndbmtd ndbd ndb_mgmd; do
  pkill -x "$daemon" || true
done
rm -rf /var/lib/mysql /etc/mysql
rm -f /etc/my.cnf /etc/init.d/mysql.server
apt-get -y remove 'mysql*' || true
apt-get -y --purge autoremove || true
rm -rf ${QUERY_BASEDIR} /usr/local/${PACKAGE_NAME}
rm -rf /var/tmp/${PACKAGE_NAME} /var/tmp/${PACKAGE_NAME}.tar.gz
"#;

const INSTALL_PREREQUISITES: &str = r#"set -e
export DEBIAN_FRONTEND=noninteractive
apt-get -y install libaio1 libaio-dev
"#;

const CREATE_SERVICE_ACCOUNT: &str = r#"getent group mysql >/dev/null || groupadd mysql
id -u mysql >/dev/null 2>&1 || useradd -g mysql mysql
"#;

const FETCH_PACKAGE: &str = r#"set -e
cd /var/tmp
wget -q -O ${PACKAGE_NAME}.tar.gz ${PACKAGE_URL}
tar -xzf ${PACKAGE_NAME}.tar.gz
"#;

const STAGE_COORDINATOR_FILES: &str = r#"set -e
cp /var/tmp/${PACKAGE_NAME}/bin/ndb_mgm* /usr/local/bin/
rm -rf /var/tmp/${PACKAGE_NAME} /var/tmp/${PACKAGE_NAME}.tar.gz
"#;

const STAGE_STORAGE_FILES: &str = r#"set -e
cp /var/tmp/${PACKAGE_NAME}/bin/ndbd /usr/local/bin/ndbd
cp /var/tmp/${PACKAGE_NAME}/bin/ndbmtd /usr/local/bin/ndbmtd
rm -rf /var/tmp/${PACKAGE_NAME} /var/tmp/${PACKAGE_NAME}.tar.gz
"#;

const STAGE_QUERY_FILES: &str = r#"set -e
cp -r /var/tmp/${PACKAGE_NAME}/ /usr/local/
ln -sfn /usr/local/${PACKAGE_NAME} ${QUERY_BASEDIR}
rm -rf /var/tmp/${PACKAGE_NAME} /var/tmp/${PACKAGE_NAME}.tar.gz
"#;

const CONFIGURE_COORDINATOR: &str = r#"set -e
mkdir -p ${COORDINATOR_DATADIR}
cat > ${COORDINATOR_DATADIR}/config.ini << 'EOF'
${COORDINATOR_CONFIG}
EOF
"#;

const CONFIGURE_STORAGE_NODE: &str = r#"set -e
mkdir -p ${STORAGE_DATADIR}
rm -f /etc/mysql/my.cnf /usr/local/mysql/my.cnf
cat > /etc/my.cnf << 'EOF'
${NODE_CONFIG}
EOF
"#;

const CONFIGURE_QUERY_NODE: &str = r#"set -e
cat > /etc/my.cnf << 'EOF'
${QUERY_NODE_CONFIG}
EOF
"#;

const UPDATE_SECURITY_POLICY: &str = r#"set -e
if [ -d /etc/apparmor.d ]; then
cat > /etc/apparmor.d/usr.sbin.mysqld << 'EOF'
${QUERY_BASEDIR}/data/ r,
${QUERY_BASEDIR}/data/** rwk,
EOF
service apparmor reload
fi
"#;

const INITIALIZE_DATABASE: &str = r#"set -e
${QUERY_BASEDIR}/scripts/mysql_install_db --user=mysql --basedir=${QUERY_BASEDIR}/ --datadir=${QUERY_BASEDIR}/data/ --defaults-file=/etc/my.cnf
cp ${QUERY_BASEDIR}/bin/mysqld_safe /usr/bin/
cp ${QUERY_BASEDIR}/bin/mysql /usr/bin/
cd ${QUERY_BASEDIR}
chown -R root .
chown -R mysql data
chgrp -R mysql .
cp ${QUERY_BASEDIR}/support-files/mysql.server /etc/init.d/
sed -i 's|^basedir=$|basedir=${QUERY_BASEDIR}/|' /etc/init.d/mysql.server
sed -i 's|^datadir=$|datadir=${QUERY_BASEDIR}/data/|' /etc/init.d/mysql.server
update-rc.d mysql.server defaults
"#;

const START_COORDINATOR: &str =
    "ndb_mgmd --configdir=${COORDINATOR_DATADIR}/ -f ${COORDINATOR_DATADIR}/config.ini\n";

const START_STORAGE_NODE: &str = "ndbd\n";

const START_QUERY_NODE: &str = "service mysql.server start\n";

// GRANT ... IDENTIFIED BY creates the account when missing, so re-running is harmless
const PROVISION_CREDENTIALS: &str = r#"set -e
mysql << 'SQL'
GRANT ALL PRIVILEGES ON *.* TO '${DB_USER}'@'%' IDENTIFIED BY '${DB_PASSWORD}' WITH GRANT OPTION;
FLUSH PRIVILEGES;
SQL
"#;

pub(crate) fn template(step: StepId) -> &'static str {
    match step {
        StepId::Purge => PURGE,
        StepId::InstallPrerequisites => INSTALL_PREREQUISITES,
        StepId::CreateServiceAccount => CREATE_SERVICE_ACCOUNT,
        StepId::FetchPackage => FETCH_PACKAGE,
        StepId::StageCoordinatorFiles => STAGE_COORDINATOR_FILES,
        StepId::StageStorageFiles => STAGE_STORAGE_FILES,
        StepId::StageQueryFiles => STAGE_QUERY_FILES,
        StepId::ConfigureCoordinator => CONFIGURE_COORDINATOR,
        StepId::ConfigureStorageNode => CONFIGURE_STORAGE_NODE,
        StepId::ConfigureQueryNode => CONFIGURE_QUERY_NODE,
        StepId::UpdateSecurityPolicy => UPDATE_SECURITY_POLICY,
        StepId::InitializeDatabase => INITIALIZE_DATABASE,
        StepId::StartCoordinator => START_COORDINATOR,
        StepId::StartStorageNode => START_STORAGE_NODE,
        StepId::StartQueryNode => START_QUERY_NODE,
        StepId::ProvisionCredentials => PROVISION_CREDENTIALS,
    }
}
